use crate::render;
use joblib::{
    JobApi, JobError, JobId, JobOrchestrator, JobReport, MonitorError, MonitorOutcome,
    SessionRegistry,
};
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// The interactive console.
///
/// Owns the session registry and is its only writer. Failures of job
/// operations are shown to the user and never end the session; only I/O
/// errors on the console itself are returned.
pub struct Shell<C, R, W> {
    orchestrator: JobOrchestrator<C>,
    registry: SessionRegistry,
    input: Lines<R>,
    out: W,
}

impl<C, R, W> Shell<C, R, W>
where
    C: JobApi + 'static,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(orchestrator: JobOrchestrator<C>, input: R, out: W) -> Self {
        Self {
            orchestrator,
            registry: SessionRegistry::new(),
            input: input.lines(),
            out,
        }
    }

    #[cfg(test)]
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    /// Run the menu until the user exits or input ends.
    pub async fn run_menu(&mut self) -> io::Result<()> {
        info!("starting interactive menu");
        loop {
            render::menu(&mut self.out)?;
            let Some(choice) = self.prompt("\nSelect an option: ").await? else {
                writeln!(self.out, "\nExiting application. Goodbye!")?;
                return Ok(());
            };
            match choice.trim() {
                "1" => self.start_job_menu().await?,
                "2" => {
                    if let Some(job_id) = self.prompt_for_job_id().await? {
                        self.show_status(job_id).await?;
                    }
                }
                "3" => {
                    if let Some(job_id) = self.prompt_for_job_id().await? {
                        self.cancel_job(job_id).await?;
                    }
                }
                "4" => {
                    if let Some(job_id) = self.prompt_for_job_id().await? {
                        self.monitor_job(job_id).await?;
                    }
                }
                "5" => self.list_jobs().await?,
                "0" => {
                    writeln!(self.out, "Exiting application. Goodbye!")?;
                    return Ok(());
                }
                _ => render::warning(&mut self.out, "Invalid option. Please try again.")?,
            }
        }
    }

    async fn start_job_menu(&mut self) -> io::Result<()> {
        writeln!(self.out, "=== START A NEW JOB ===")?;
        let Some(job_type) = self.prompt("Enter job type: ").await? else {
            return Ok(());
        };
        let Some(job_name) = self.prompt("Enter job name: ").await? else {
            return Ok(());
        };
        self.start_job(job_type.trim(), job_name.trim()).await?;
        Ok(())
    }

    /// Start a job and record it in the session. Returns the new id on success.
    pub async fn start_job(&mut self, job_type: &str, job_name: &str) -> io::Result<Option<JobId>> {
        if job_type.trim().is_empty() || job_name.trim().is_empty() {
            render::error(&mut self.out, "Job type and name cannot be empty")?;
            return Ok(None);
        }

        writeln!(self.out, "\nStarting job...")?;
        match self.orchestrator.start_job(job_type, job_name).await {
            Ok(job_id) => {
                self.registry.record(job_id);
                render::success(
                    &mut self.out,
                    &format!("Job started successfully with ID: {}", job_id),
                )?;
                Ok(Some(job_id))
            }
            Err(e) => {
                render::error(&mut self.out, &format!("Failed to start job: {}", e))?;
                Ok(None)
            }
        }
    }

    /// Show a job's details. Returns whether the status could be fetched.
    pub async fn show_status(&mut self, job_id: JobId) -> io::Result<bool> {
        writeln!(self.out, "\nChecking job status...")?;
        match self.orchestrator.job_status(job_id).await {
            Ok(report) => {
                render::job_details(&mut self.out, &report)?;
                Ok(true)
            }
            Err(e) => {
                render::error(&mut self.out, &format!("Failed to get job status: {}", e))?;
                Ok(false)
            }
        }
    }

    /// Ask the gateway to cancel a job. Returns whether it was cancelled.
    pub async fn cancel_job(&mut self, job_id: JobId) -> io::Result<bool> {
        writeln!(self.out, "\nCancelling job...")?;
        match self.orchestrator.cancel_job(job_id).await {
            Ok(true) => {
                render::success(
                    &mut self.out,
                    &format!("Job with ID {} has been cancelled successfully", job_id),
                )?;
                Ok(true)
            }
            Ok(false) => {
                render::warning(
                    &mut self.out,
                    &format!(
                        "Could not cancel job with ID {}. It may be already completed or not found.",
                        job_id
                    ),
                )?;
                match self.orchestrator.job_status(job_id).await {
                    Ok(report) => writeln!(
                        self.out,
                        "Current job status: {}",
                        render::status(&report.status)
                    )?,
                    Err(JobError::NotFound { .. }) => {
                        writeln!(self.out, "The job was not found on the server.")?
                    }
                    Err(e) => debug!(job_id = %job_id, error = %e, "status lookup after cancel failed"),
                }
                Ok(false)
            }
            Err(e) => {
                render::error(&mut self.out, &format!("Failed to cancel job: {}", e))?;
                Ok(false)
            }
        }
    }

    /// Follow a job until it ends or the user enters a line.
    ///
    /// The monitor runs in its own task; this side races its completion
    /// against the next line of input. Returns whether monitoring ended
    /// without an error.
    pub async fn monitor_job(&mut self, job_id: JobId) -> io::Result<bool> {
        writeln!(self.out, "\nMonitoring job (press Enter to stop)...\n")?;
        self.out.flush()?;

        let mut handle = self.orchestrator.start_monitor(job_id);
        let mut updates = handle.take_updates();
        let stop = handle.stop_handle();
        let completion = handle.await_completion();
        tokio::pin!(completion);

        let mut input_open = true;
        let result = loop {
            tokio::select! {
                biased;
                Some(report) = next_update(&mut updates) => {
                    render::monitor_update(&mut self.out, &report)?;
                    self.out.flush()?;
                }
                result = &mut completion => break result,
                line = self.input.next_line(), if input_open && !stop.is_stop_requested() => {
                    match line {
                        Ok(Some(_)) => stop.request_stop(),
                        // no more input, let the monitor run to its end
                        Ok(None) => input_open = false,
                        Err(e) => {
                            stop.request_stop();
                            return Err(e);
                        }
                    }
                }
            }
        };

        if let Some(updates) = updates.as_mut() {
            while let Ok(report) = updates.try_recv() {
                render::monitor_update(&mut self.out, &report)?;
            }
        }

        match result {
            Ok(MonitorOutcome::Finished { report, .. }) => {
                writeln!(
                    self.out,
                    "\nJob {} has finished with status: {}",
                    job_id,
                    render::status(&report.status)
                )?;
                Ok(true)
            }
            Ok(MonitorOutcome::Cancelled { .. }) => {
                writeln!(self.out, "\nMonitoring stopped by user.")?;
                Ok(true)
            }
            Err(e) => {
                if let MonitorError::Aborted = e {
                    error!(job_id = %job_id, "monitor task aborted");
                }
                render::error(&mut self.out, &format!("Error while monitoring job: {}", e))?;
                Ok(false)
            }
        }
    }

    /// Show every job of this session with its current status.
    pub async fn list_jobs(&mut self) -> io::Result<()> {
        writeln!(self.out, "=== ACTIVE JOBS ===")?;
        if self.registry.is_empty() {
            writeln!(self.out, "No active jobs found in this session.")?;
            return Ok(());
        }

        writeln!(self.out, "Jobs started in this session:")?;
        let mut rows = Vec::with_capacity(self.registry.len());
        for &job_id in self.registry.jobs() {
            let status = self
                .orchestrator
                .job_status(job_id)
                .await
                .map(|report| report.status);
            rows.push((job_id, status));
        }
        render::job_table(&mut self.out, rows.iter().map(|(id, row)| (*id, row)))
    }

    async fn prompt_for_job_id(&mut self) -> io::Result<Option<JobId>> {
        if !self.registry.is_empty() {
            writeln!(self.out, "Recent jobs from this session:")?;
            for (i, job_id) in self.registry.jobs().iter().enumerate() {
                writeln!(self.out, "{}. {}", i + 1, job_id)?;
            }
            writeln!(
                self.out,
                "\nYou can enter a job number from the list or paste a full job ID."
            )?;
        }

        let Some(input) = self.prompt("Enter job ID: ").await? else {
            return Ok(None);
        };
        match self.registry.resolve(&input) {
            Ok(job_id) => Ok(Some(job_id)),
            Err(e) => {
                render::error(&mut self.out, &e.to_string())?;
                Ok(None)
            }
        }
    }

    /// Print `text` and read one line. `None` once input has ended.
    async fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.out, "{}", text)?;
        self.out.flush()?;
        self.input.next_line().await
    }
}

async fn next_update(updates: &mut Option<mpsc::UnboundedReceiver<JobReport>>) -> Option<JobReport> {
    match updates {
        Some(updates) => updates.recv().await,
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use joblib::{JobDescriptor, JobStatus};
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::io::{AsyncWriteExt, BufReader};

    type Answer = Result<JobStatus, JobError>;

    #[derive(Default)]
    struct GatewayState {
        jobs: HashMap<JobId, VecDeque<Answer>>,
        script_for_new_jobs: Vec<Answer>,
        start_error: Option<JobError>,
        fetches: usize,
    }

    /// In-memory gateway: each job replays its script, repeating the last answer.
    #[derive(Clone, Default)]
    struct FakeGateway {
        state: Arc<Mutex<GatewayState>>,
    }

    impl FakeGateway {
        fn with_script(script: Vec<Answer>) -> Self {
            let gateway = Self::default();
            gateway.state.lock().unwrap().script_for_new_jobs = script;
            gateway
        }

        fn add_job(&self, script: Vec<Answer>) -> JobId {
            let job_id = JobId::new_v4();
            self.state.lock().unwrap().jobs.insert(job_id, script.into());
            job_id
        }

        fn fetches(&self) -> usize {
            self.state.lock().unwrap().fetches
        }
    }

    #[async_trait]
    impl JobApi for FakeGateway {
        async fn start(&self, _: &str, _: &str) -> joblib::error::Result<JobId> {
            let mut state = self.state.lock().unwrap();
            if let Some(e) = state.start_error.clone() {
                return Err(e);
            }
            let job_id = JobId::new_v4();
            let script = state.script_for_new_jobs.clone().into();
            state.jobs.insert(job_id, script);
            Ok(job_id)
        }

        async fn get_status(&self, job_id: JobId) -> joblib::error::Result<JobReport> {
            let mut state = self.state.lock().unwrap();
            state.fetches += 1;
            let script = state
                .jobs
                .get_mut(&job_id)
                .ok_or(JobError::NotFound { job_id })?;
            let answer = if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script.front().cloned().unwrap()
            };
            answer.map(|status| JobReport {
                descriptor: JobDescriptor {
                    job_id,
                    job_type: "Report".into(),
                    job_name: "Q1".into(),
                },
                status,
            })
        }

        async fn cancel(&self, job_id: JobId) -> joblib::error::Result<bool> {
            let mut state = self.state.lock().unwrap();
            match state.jobs.get_mut(&job_id) {
                Some(script) if script.front() == Some(&Ok(JobStatus::Running)) => {
                    *script = VecDeque::from([Ok(JobStatus::Cancelled)]);
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
    }

    async fn run_script(gateway: &FakeGateway, input: &str) -> (String, usize) {
        let orchestrator = JobOrchestrator::new(gateway.clone());
        let mut shell = Shell::new(orchestrator, input.as_bytes(), Vec::new());
        shell.run_menu().await.unwrap();
        let recorded = shell.registry().len();
        let output = String::from_utf8(shell.into_output()).unwrap();
        (output, recorded)
    }

    #[tokio::test]
    async fn start_then_status_from_the_session_list() {
        let gateway = FakeGateway::with_script(vec![Ok(JobStatus::Running)]);
        let (output, recorded) = run_script(&gateway, "1\nReport\nQ1\n2\n1\n0\n").await;

        assert_eq!(recorded, 1);
        assert!(output.contains("Job started successfully with ID:"), "{}", output);
        assert!(output.contains("Recent jobs from this session:"), "{}", output);
        assert!(output.contains("Type: Report"), "{}", output);
        assert!(output.contains("Name: Q1"), "{}", output);
        assert!(output.contains("Running"), "{}", output);
        assert!(output.contains("Goodbye"), "{}", output);
    }

    #[tokio::test]
    async fn blank_job_fields_are_rejected() {
        let gateway = FakeGateway::default();
        let (output, recorded) = run_script(&gateway, "1\n   \nQ1\n0\n").await;

        assert_eq!(recorded, 0);
        assert!(output.contains("Job type and name cannot be empty"), "{}", output);
    }

    #[tokio::test]
    async fn failed_start_is_reported_and_menu_continues() {
        let gateway = FakeGateway::default();
        gateway.state.lock().unwrap().start_error = Some(JobError::transport("connection refused"));
        let (output, recorded) = run_script(&gateway, "1\nReport\nQ1\n9\n0\n").await;

        assert_eq!(recorded, 0);
        assert!(output.contains("Failed to start job: transport error"), "{}", output);
        assert!(output.contains("Invalid option"), "{}", output);
        assert!(output.contains("Goodbye"), "{}", output);
    }

    #[tokio::test]
    async fn bad_job_ids_are_reported() {
        let gateway = FakeGateway::default();
        let (output, _) = run_script(&gateway, "2\nxyz\n3\n\n0\n").await;

        assert!(output.contains("Invalid job ID format"), "{}", output);
        assert!(output.contains("Job ID cannot be empty"), "{}", output);
        assert_eq!(gateway.fetches(), 0);
    }

    #[tokio::test]
    async fn unknown_job_status_is_not_found() {
        let gateway = FakeGateway::default();
        let job_id = JobId::new_v4();
        let (output, _) = run_script(&gateway, &format!("2\n{}\n0\n", job_id)).await;

        assert!(output.contains("Failed to get job status"), "{}", output);
        assert!(output.contains("not found"), "{}", output);
    }

    #[tokio::test]
    async fn cancel_reports_both_outcomes() {
        let gateway = FakeGateway::default();
        let running = gateway.add_job(vec![Ok(JobStatus::Running)]);
        let completed = gateway.add_job(vec![Ok(JobStatus::Completed)]);
        let unknown = JobId::new_v4();
        let input = format!("3\n{}\n3\n{}\n3\n{}\n0\n", running, completed, unknown);
        let (output, _) = run_script(&gateway, &input).await;

        assert!(
            output.contains(&format!("Job with ID {} has been cancelled successfully", running)),
            "{}",
            output
        );
        assert!(
            output.contains(&format!("Could not cancel job with ID {}", completed)),
            "{}",
            output
        );
        assert!(output.contains("Current job status:"), "{}", output);
        assert!(output.contains("The job was not found on the server."), "{}", output);
    }

    #[tokio::test]
    async fn list_shows_each_session_job() {
        let gateway = FakeGateway::with_script(vec![Ok(JobStatus::Completed)]);
        let (output, _) = run_script(&gateway, "5\n1\nReport\nQ1\n1\nExport\nQ2\n5\n0\n").await;
        assert!(output.contains("No active jobs found in this session."), "{}", output);
        assert!(output.contains("Jobs started in this session:"), "{}", output);
        assert_eq!(output.matches("Completed").count(), 2, "{}", output);

        let gateway = FakeGateway::with_script(vec![Err(JobError::transport("reset"))]);
        let (output, _) = run_script(&gateway, "1\nReport\nQ1\n5\n0\n").await;
        assert!(output.contains("Error: could not retrieve status"), "{}", output);
    }

    #[tokio::test(start_paused = true)]
    async fn monitor_runs_until_the_job_finishes() {
        let gateway = FakeGateway::with_script(vec![
            Ok(JobStatus::Running),
            Ok(JobStatus::Running),
            Ok(JobStatus::Completed),
        ]);
        // input ends right after the selection, so nothing stops the monitor
        let (output, _) = run_script(&gateway, "1\nReport\nQ1\n4\n1\n").await;

        assert_eq!(gateway.fetches(), 3);
        let updates = output
            .lines()
            .filter(|line| line.starts_with("Job ") && line.contains(" is "))
            .count();
        assert_eq!(updates, 3, "{}", output);
        assert!(output.contains("has finished with status"), "{}", output);
        assert!(!output.contains("stopped by user"), "{}", output);
    }

    #[tokio::test(start_paused = true)]
    async fn enter_stops_the_monitor() {
        let gateway = FakeGateway::default();
        let job_id = gateway.add_job(vec![Ok(JobStatus::Running)]);

        let (mut keyboard, console) = tokio::io::duplex(256);
        let orchestrator = JobOrchestrator::new(gateway.clone());
        let mut shell = Shell::new(orchestrator, BufReader::new(console), Vec::new());
        let session = tokio::spawn(async move {
            shell.run_menu().await.unwrap();
            shell
        });

        keyboard
            .write_all(format!("4\n{}\n", job_id).as_bytes())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(2500)).await;
        keyboard.write_all(b"\n").await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        keyboard.write_all(b"0\n").await.unwrap();

        let shell = session.await.unwrap();
        let output = String::from_utf8(shell.into_output()).unwrap();
        assert!(output.contains("Monitoring stopped by user."), "{}", output);
        assert!(output.contains("Goodbye"), "{}", output);
        // fetches at 0s, 1s and 2s; none after the stop
        assert_eq!(gateway.fetches(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn monitor_error_returns_to_the_menu() {
        let gateway = FakeGateway::default();
        let unknown = JobId::new_v4();
        let (output, _) = run_script(&gateway, &format!("4\n{}\n", unknown)).await;

        assert!(output.contains("Error while monitoring job"), "{}", output);
        assert!(output.contains("Goodbye"), "{}", output);
    }
}
