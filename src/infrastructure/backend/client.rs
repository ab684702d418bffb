//! Attendance backend HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::dto::{AttendanceRecordsResponse, CoursesResponse, ErrorResponse, StudentsResponse};
use crate::domain::entities::{
    AttendanceRecord, Course, CourseCode, LecturerEmail, NewLecturer, Student, StudentSubmission,
};
use crate::domain::errors::BackendError;
use crate::domain::ports::BackendPort;

const USER_AGENT: &str = concat!("rollcall/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the attendance backend.
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    /// Creates client for the given base URL.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::unexpected(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Builds an endpoint URL. Each segment is percent-encoded, so course
    /// codes with spaces or slashes stay a single segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::invalid_url(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, BackendError> {
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_send_error)?;

        Self::read_json(response).await
    }

    async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        debug!(url = %url, "POST");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(map_send_error)?;

        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
        let status = response.status();

        if !status.is_success() {
            return Err(Self::handle_error_response(status, response).await);
        }

        response.json::<T>().await.map_err(|e| {
            warn!(error = %e, "Failed to parse backend response");
            BackendError::decode(e.to_string())
        })
    }

    async fn handle_error_response(status: StatusCode, response: reqwest::Response) -> BackendError {
        let message = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .and_then(ErrorResponse::into_message)
            .unwrap_or_else(|| format!("HTTP {status}"));

        warn!(status = status.as_u16(), message = %message, "Backend returned error");

        match status {
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
                BackendError::network(format!("backend is temporarily unavailable: {message}"))
            }
            _ => BackendError::status(status.as_u16(), message),
        }
    }
}

fn map_send_error(e: reqwest::Error) -> BackendError {
    warn!(error = %e, "Failed to reach backend");
    if e.is_timeout() {
        BackendError::network("request timed out")
    } else if e.is_connect() {
        BackendError::network("failed to connect to backend")
    } else {
        BackendError::network(e.to_string())
    }
}

#[async_trait]
impl BackendPort for BackendClient {
    async fn fetch_courses(&self, lecturer: &LecturerEmail) -> Result<Vec<Course>, BackendError> {
        let url = self.endpoint(&["courses", lecturer.as_str()])?;
        let response: CoursesResponse = self.get_json(url).await?;
        Ok(response.courses)
    }

    async fn fetch_enrolled_students(
        &self,
        course_code: &CourseCode,
    ) -> Result<Vec<Student>, BackendError> {
        let url = self.endpoint(&["courses", "enroll", course_code.as_str()])?;
        let response: StudentsResponse = self.get_json(url).await?;
        Ok(response.students)
    }

    async fn fetch_attendance_records(
        &self,
        course_code: &CourseCode,
    ) -> Result<Vec<AttendanceRecord>, BackendError> {
        let url = self.endpoint(&["courses", "attendance", course_code.as_str()])?;
        let response: AttendanceRecordsResponse = self.get_json(url).await?;
        Ok(response.attendance_records)
    }

    async fn enroll_student(
        &self,
        lecturer: &LecturerEmail,
        submission: &StudentSubmission,
    ) -> Result<Value, BackendError> {
        let url = self.endpoint(&["courses", "enroll", lecturer.as_str()])?;
        self.post_json(url, submission).await
    }

    async fn mark_attendance(&self, submission: &StudentSubmission) -> Result<Value, BackendError> {
        let url = self.endpoint(&["courses", "attendance"])?;
        self.post_json(url, submission).await
    }

    async fn create_lecturer(&self, lecturer: &NewLecturer) -> Result<Value, BackendError> {
        let url = self.endpoint(&["lecturers"])?;
        self.post_json(url, lecturer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accepts one request, answers it and returns the raw request text.
    async fn serve_once(status: &'static str, body: &'static str) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];

            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    let headers = String::from_utf8_lossy(&request[..end]).to_lowercase();
                    let body_len = headers
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .map_or(0, |v| v.trim().parse::<usize>().unwrap());
                    if request.len() >= end + 4 + body_len {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&request).into_owned()
        });

        (Url::parse(&format!("http://{addr}/")).unwrap(), handle)
    }

    fn client(base_url: Url) -> BackendClient {
        BackendClient::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = client(Url::parse("http://localhost:5000/").unwrap());

        let url = client
            .endpoint(&["courses", "enroll", "CS 101/A"])
            .unwrap();

        assert_eq!(url.path(), "/courses/enroll/CS%20101%2FA");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client(Url::parse("https://uni.edu/api").unwrap());

        let url = client.endpoint(&["lecturers"]).unwrap();

        assert_eq!(url.as_str(), "https://uni.edu/api/lecturers");
    }

    #[tokio::test]
    async fn test_fetch_courses() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"courses":[{"_id":"c1","courseCode":"CS101","courseName":"Intro"}]}"#,
        )
        .await;

        let lecturer = LecturerEmail::parse("joelojerinde@gmail.com").unwrap();
        let courses = client(base).fetch_courses(&lecturer).await.unwrap();

        assert_eq!(courses, vec![Course::new("c1", "CS101", "Intro")]);
        let request = server.await.unwrap();
        assert!(request.starts_with("GET /courses/joelojerinde@gmail.com HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_fetch_enrolled_students() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"students":[{"_id":"s1","name":"Ada","matricNo":"M100"}]}"#,
        )
        .await;

        let students = client(base)
            .fetch_enrolled_students(&CourseCode::new("CS101"))
            .await
            .unwrap();

        assert_eq!(students, vec![Student::new("s1", "Ada", "M100")]);
        assert!(server.await.unwrap().starts_with("GET /courses/enroll/CS101 "));
    }

    #[tokio::test]
    async fn test_legacy_enroll_posts_submission() {
        let (base, server) = serve_once("201 Created", r#"{"name":"Ada"}"#).await;

        let lecturer = LecturerEmail::parse("l@uni.edu").unwrap();
        let submission =
            StudentSubmission::new("Ada", "M100", &Course::new("c1", "CS101", "Intro"));
        let record = client(base)
            .enroll_student(&lecturer, &submission)
            .await
            .unwrap();

        assert_eq!(record["name"], "Ada");
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /courses/enroll/l@uni.edu "));
        assert!(request.ends_with(
            r#"{"name":"Ada","matricNo":"M100","courseCode":"CS101","courseName":"Intro"}"#
        ));
    }

    #[tokio::test]
    async fn test_error_status_carries_message() {
        let (base, _server) = serve_once("404 Not Found", r#"{"message":"course not found"}"#).await;

        let result = client(base)
            .fetch_attendance_records(&CourseCode::new("XX"))
            .await;

        match result {
            Err(BackendError::Status { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "course not found");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let base = Url::parse(&format!("http://{addr}/")).unwrap();
        let lecturer = LecturerEmail::parse("l@uni.edu").unwrap();
        let result = client(base).fetch_courses(&lecturer).await;

        assert!(result.unwrap_err().is_network_error());
    }
}
