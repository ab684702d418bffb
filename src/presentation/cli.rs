//! Command-line front end driving the views.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr, bail};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::views::{
    AttendanceRecordsView, DashboardView, EnrolledStudentsView, SubmissionMode, SubmitOutcome,
};
use crate::application::dto::LecturerRegistration;
use crate::application::services::{EventBridge, FormKind, PendingAction};
use crate::application::use_cases::RegisterLecturerUseCase;
use crate::domain::entities::{CourseCode, LecturerEmail, MatricNo};
use crate::domain::ports::BackendPort;
use crate::infrastructure::backend::BackendClient;
use crate::infrastructure::config::{AppConfig, Command, StorageManager, StudentArgs};
use crate::infrastructure::realtime::{
    ChannelClient, ChannelClientConfig, ConnectionFactory, websocket_factory,
};

const PUMP_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs one command against the backend and writes a text report.
///
/// The event channel is only connected by commands that emit on it.
pub struct CommandRunner {
    config: AppConfig,
    storage: StorageManager,
    backend: Arc<dyn BackendPort>,
    channel: Arc<ChannelClient>,
    bridge: Arc<EventBridge>,
    pump: Option<JoinHandle<()>>,
}

impl CommandRunner {
    /// Creates a runner talking to the configured backend.
    ///
    /// # Errors
    /// Returns error if the backend URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(config: AppConfig, storage: StorageManager) -> Result<Self> {
        let base_url = config.backend_base_url()?;
        let backend = BackendClient::new(base_url, config.request_timeout())?;
        Ok(Self::with_transport(
            config,
            storage,
            Arc::new(backend),
            websocket_factory(),
        ))
    }

    fn with_transport(
        config: AppConfig,
        storage: StorageManager,
        backend: Arc<dyn BackendPort>,
        connections: ConnectionFactory,
    ) -> Self {
        let channel = Arc::new(
            ChannelClient::new(
                ChannelClientConfig::new()
                    .with_auto_reconnect(config.channel.auto_reconnect)
                    .with_max_reconnect_attempts(config.channel.max_reconnect_attempts),
            )
            .with_connection_factory(connections),
        );
        let bridge = Arc::new(
            EventBridge::new(channel.clone(), config.feedback_timeout())
                .with_request_tags(config.channel.tag_requests),
        );

        Self {
            config,
            storage,
            backend,
            channel,
            bridge,
            pump: None,
        }
    }

    /// Runs the command, then closes the event channel if it was opened.
    ///
    /// # Errors
    /// Returns error if the command fails or its report cannot be written.
    pub async fn run<W: Write>(mut self, command: Command, out: &mut W) -> Result<()> {
        let result = self.dispatch(command, out).await;
        self.shutdown().await;
        result
    }

    async fn dispatch<W: Write>(&mut self, command: Command, out: &mut W) -> Result<()> {
        match command {
            Command::Courses => self.list_courses(out).await,
            Command::Enroll { student, legacy } => {
                self.submit_form(FormKind::Enroll, &student, legacy, out).await
            }
            Command::Attend { student, legacy } => {
                self.submit_form(FormKind::Attendance, &student, legacy, out)
                    .await
            }
            Command::Students { course } => self.list_students(CourseCode::new(course), out).await,
            Command::RemoveStudent { course, matric_no } => {
                self.remove_student(CourseCode::new(course), MatricNo::new(matric_no), out)
                    .await
            }
            Command::Attendance { course } => {
                self.list_attendance(CourseCode::new(course), out).await
            }
            Command::RegisterLecturer {
                name,
                email,
                courses,
                remember,
            } => {
                let registration = LecturerRegistration {
                    name,
                    email,
                    courses,
                };
                self.register_lecturer(registration, remember, out).await
            }
        }
    }

    fn lecturer(&self) -> Result<LecturerEmail> {
        self.config
            .lecturer()
            .wrap_err("set lecturer_email in the config file or pass --lecturer")
    }

    fn connect_channel(&mut self) -> Result<()> {
        if self.pump.is_some() {
            return Ok(());
        }

        let url = self.config.channel_base_url()?;
        let events = self
            .channel
            .connect(&url)
            .wrap_err_with(|| format!("failed to start event channel to {url}"))?;
        self.pump = Some(self.bridge.spawn_pump(events));

        info!(url = %url, "Event channel started");
        Ok(())
    }

    async fn shutdown(&mut self) {
        let Some(pump) = self.pump.take() else {
            return;
        };

        self.channel.disconnect();
        if tokio::time::timeout(PUMP_SHUTDOWN_TIMEOUT, pump).await.is_err() {
            warn!("Event pump did not stop in time");
        }
        debug!("Event channel closed");
    }

    async fn await_feedback(&self, pending: PendingAction) -> Result<()> {
        match pending.wait().await {
            Ok(_) => Ok(()),
            Err(e) if e.outcome_unknown() => {
                let status = self.bridge.connection_status();
                Err(e).wrap_err_with(|| format!("no confirmation, event channel is {status}"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn mount_dashboard(&self, mode: SubmissionMode) -> Result<DashboardView> {
        let view =
            DashboardView::mount(self.lecturer()?, self.backend.clone(), self.bridge.clone(), mode)
                .await;
        if let Some(message) = view.load_error() {
            bail!("could not load courses: {message}");
        }
        Ok(view)
    }

    async fn list_courses<W: Write>(&self, out: &mut W) -> Result<()> {
        let view = self.mount_dashboard(SubmissionMode::default()).await?;

        if view.courses().is_empty() {
            writeln!(out, "No courses found for {}.", view.lecturer())?;
            return Ok(());
        }
        for course in view.courses() {
            writeln!(out, "{}\t{}", course.course_code(), course.course_name())?;
        }
        Ok(())
    }

    async fn submit_form<W: Write>(
        &mut self,
        kind: FormKind,
        student: &StudentArgs,
        legacy: bool,
        out: &mut W,
    ) -> Result<()> {
        let mode = if legacy {
            SubmissionMode::LegacyHttp
        } else {
            SubmissionMode::Channel
        };
        let mut view = self.mount_dashboard(mode).await?;

        let course = CourseCode::new(student.course.as_str());
        match kind {
            FormKind::Enroll => view.open_enroll(&course)?,
            FormKind::Attendance => view.open_attendance(&course)?,
        }
        view.form_mut().set_name(student.name.as_str());
        view.form_mut().set_matric_no(student.matric_no.as_str());

        if mode == SubmissionMode::Channel {
            self.connect_channel()?;
        }

        let matric_no = MatricNo::new(student.matric_no.as_str());
        match view.submit().await? {
            SubmitOutcome::Emitted(pending) => {
                writeln!(
                    out,
                    "Sent {} for {matric_no} in {course}, waiting for feedback...",
                    pending.kind()
                )?;
                self.await_feedback(pending).await?;
            }
            SubmitOutcome::Recorded(response) => {
                debug!(response = %response, "Backend accepted submission");
            }
        }

        match kind {
            FormKind::Enroll => writeln!(out, "Enrolled {matric_no} in {course}.")?,
            FormKind::Attendance => writeln!(out, "Marked {matric_no} present in {course}.")?,
        }
        Ok(())
    }

    async fn mount_roster(&self, course: CourseCode) -> Result<EnrolledStudentsView> {
        let view = EnrolledStudentsView::mount(course, self.backend.clone(), self.bridge.clone()).await;
        if let Some(message) = view.load_error() {
            bail!("could not load students of {}: {message}", view.course_code());
        }
        Ok(view)
    }

    async fn list_students<W: Write>(&self, course: CourseCode, out: &mut W) -> Result<()> {
        let view = self.mount_roster(course).await?;

        if view.students().is_empty() {
            writeln!(out, "No students enrolled in {}.", view.course_code())?;
            return Ok(());
        }
        for student in view.students() {
            writeln!(out, "{}\t{}", student.matric_no(), student.name())?;
        }
        Ok(())
    }

    async fn remove_student<W: Write>(
        &mut self,
        course: CourseCode,
        matric_no: MatricNo,
        out: &mut W,
    ) -> Result<()> {
        let mut view = self.mount_roster(course).await?;
        if !view.students().iter().any(|s| s.matric_no() == &matric_no) {
            bail!("{matric_no} is not enrolled in {}", view.course_code());
        }

        self.connect_channel()?;
        let pending = view.remove(matric_no.clone()).await?;
        writeln!(
            out,
            "Sent removal of {matric_no} from {}, waiting for feedback...",
            view.course_code()
        )?;
        self.await_feedback(pending).await?;
        view.next_feedback().await;

        writeln!(
            out,
            "Removed {matric_no} from {}. {} students remain.",
            view.course_code(),
            view.students().len()
        )?;
        Ok(())
    }

    async fn list_attendance<W: Write>(&self, course: CourseCode, out: &mut W) -> Result<()> {
        let view = AttendanceRecordsView::mount(course, self.backend.clone()).await;
        if let Some(message) = view.load_error() {
            bail!("could not load attendance of {}: {message}", view.course_code());
        }

        if view.records().is_empty() {
            writeln!(out, "No attendance records for {}.", view.course_code())?;
            return Ok(());
        }
        for record in view.records() {
            writeln!(out, "{}\t{} present", record.date(), record.headcount())?;
            for student in record.students_present() {
                writeln!(out, "  {}\t{}", student.matric_no(), student.name())?;
            }
        }
        Ok(())
    }

    async fn register_lecturer<W: Write>(
        &self,
        registration: LecturerRegistration,
        remember: bool,
        out: &mut W,
    ) -> Result<()> {
        let email = registration.email.clone();
        let course_count = registration.courses.len();

        RegisterLecturerUseCase::new(self.backend.clone())
            .execute(registration)
            .await?;
        let email = LecturerEmail::parse(email)?;
        writeln!(out, "Registered {email} with {course_count} courses.")?;

        if remember {
            self.storage
                .update_config(self.config.config.as_deref(), |stored| {
                    stored.lecturer_email = Some(email.as_str().to_string());
                })?;
            info!(lecturer = %email, "Lecturer saved to config");
            writeln!(out, "Saved {email} as the configured lecturer.")?;
        }
        Ok(())
    }
}
