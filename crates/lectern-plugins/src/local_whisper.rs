//! Local Whisper transcription behind the submit/poll contract
//!
//! `submit` spawns the whisper CLI in a background task and returns at once; `poll`
//! reports RUNNING until the process exits. The finished transcript is rewritten into
//! the same `results.transcripts[0].transcript` document AWS Transcribe produces and
//! exposed as a `file://` locator, so downstream stages see one format.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::process::Command;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::transcription::{JobHandle, JobPoll, TranscriptionClient};

#[derive(Debug, Clone)]
enum WhisperState {
    Running,
    Completed(PathBuf),
    Failed(String),
}

struct WhisperJob {
    state: Arc<Mutex<WhisperState>>,
    task: JoinHandle<()>,
    // Dropping the job removes its output directory
    _output: TempDir,
}

#[derive(Deserialize)]
struct WhisperOutput {
    text: String,
}

pub struct LocalWhisperClient {
    whisper_path: String,
    model: String,
    jobs: Mutex<HashMap<String, WhisperJob>>,
}

impl LocalWhisperClient {
    pub fn new(whisper_path: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            whisper_path: whisper_path.into(),
            model: model.into(),
            jobs: Mutex::new(HashMap::new()),
        }
    }

    async fn run(
        whisper_path: String,
        model: String,
        language: String,
        input: PathBuf,
        output_dir: PathBuf,
    ) -> Result<PathBuf> {
        let output = Command::new(&whisper_path)
            .arg(&input)
            .args(["--model", &model])
            .args(["--language", &language])
            .args(["--output_format", "json"])
            .arg("--output_dir")
            .arg(&output_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("Failed to spawn {}", whisper_path))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: String = stderr
                .lines()
                .rev()
                .take(5)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect::<Vec<_>>()
                .join("\n");
            anyhow::bail!("whisper exited with {}: {}", output.status, tail);
        }

        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .context("Input path has no file name")?;
        let raw = tokio::fs::read(output_dir.join(format!("{}.json", stem)))
            .await
            .context("Whisper did not produce a JSON transcript")?;
        let parsed: WhisperOutput =
            serde_json::from_slice(&raw).context("Failed to parse whisper JSON output")?;

        let normalized = json!({
            "results": {
                "transcripts": [{ "transcript": parsed.text.trim() }]
            },
            "status": "COMPLETED"
        });
        let transcript_path = output_dir.join("transcript.json");
        tokio::fs::write(&transcript_path, serde_json::to_vec(&normalized)?)
            .await
            .context("Failed to write normalized transcript")?;

        Ok(transcript_path)
    }
}

fn local_path(locator: &str) -> Result<PathBuf> {
    let path = locator
        .strip_prefix("file://")
        .context("Local whisper requires a file:// media locator")?;
    Ok(Path::new(path).to_path_buf())
}

/// "en-US" -> "en"; whisper takes bare language codes
fn whisper_language(language_code: &str) -> String {
    language_code
        .split(['-', '_'])
        .next()
        .unwrap_or(language_code)
        .to_lowercase()
}

#[async_trait]
impl TranscriptionClient for LocalWhisperClient {
    fn name(&self) -> &str {
        "local_whisper"
    }

    async fn submit(
        &self,
        media_locator: &str,
        language_code: &str,
        _media_format: &str,
    ) -> Result<JobHandle> {
        let input = local_path(media_locator)?;
        if !tokio::fs::try_exists(&input).await.unwrap_or(false) {
            anyhow::bail!("Media file for transcription does not exist");
        }

        let output = tempfile::Builder::new()
            .prefix("lectern-whisper-")
            .tempdir()
            .context("Failed to create whisper output directory")?;

        let job_name = format!("whisper-{}", Uuid::new_v4());
        let state = Arc::new(Mutex::new(WhisperState::Running));

        let task_state = state.clone();
        let whisper_path = self.whisper_path.clone();
        let model = self.model.clone();
        let language = whisper_language(language_code);
        let output_dir = output.path().to_path_buf();
        let task_job_name = job_name.clone();
        let task = tokio::spawn(async move {
            let result = Self::run(whisper_path, model, language, input, output_dir).await;
            let next = match result {
                Ok(path) => {
                    tracing::info!(transcription_job_name = %task_job_name, "Whisper transcription finished");
                    WhisperState::Completed(path)
                }
                Err(e) => {
                    tracing::warn!(transcription_job_name = %task_job_name, error = %e, "Whisper transcription failed");
                    WhisperState::Failed(e.to_string())
                }
            };
            *task_state.lock().await = next;
        });

        self.jobs.lock().await.insert(
            job_name.clone(),
            WhisperJob {
                state,
                task,
                _output: output,
            },
        );

        tracing::info!(transcription_job_name = %job_name, "Started whisper transcription");
        Ok(JobHandle::new(job_name))
    }

    async fn poll(&self, handle: &JobHandle) -> Result<JobPoll> {
        let state = {
            let jobs = self.jobs.lock().await;
            let job = jobs
                .get(handle.name())
                .with_context(|| format!("Unknown whisper job {}", handle))?;
            job.state.clone()
        };

        let poll = match &*state.lock().await {
            WhisperState::Running => JobPoll::running(),
            WhisperState::Completed(path) => JobPoll::completed(format!("file://{}", path.display())),
            WhisperState::Failed(reason) => JobPoll::failed(Some(reason.clone())),
        };
        Ok(poll)
    }

    async fn cancel(&self, handle: &JobHandle) -> Result<()> {
        self.release(handle).await;
        Ok(())
    }

    async fn release(&self, handle: &JobHandle) {
        if let Some(job) = self.jobs.lock().await.remove(handle.name()) {
            // Aborting drops the child future, and kill_on_drop stops the process
            job.task.abort();
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::transcription::JobStatus;
    use std::os::unix::fs::PermissionsExt;
    use std::time::Duration;

    fn write_script(dir: &Path, body: &str) -> String {
        let path = dir.join("fake-whisper.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    async fn wait_terminal(client: &LocalWhisperClient, handle: &JobHandle) -> JobPoll {
        for _ in 0..200 {
            let poll = client.poll(handle).await.unwrap();
            if poll.status.is_terminal() {
                return poll;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("whisper job did not finish");
    }

    #[tokio::test]
    async fn test_completed_job_exposes_normalized_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(
            dir.path(),
            r#"input="$1"; out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--output_dir" ]; then out="$2"; fi
  shift
done
name=$(basename "$input")
printf '{"text": " hello from whisper ", "segments": []}' > "$out/${name%.*}.json"
"#,
        );
        let audio = dir.path().join("lecture.mp3");
        std::fs::write(&audio, b"audio").unwrap();

        let client = LocalWhisperClient::new(script, "base");
        let handle = client
            .submit(&format!("file://{}", audio.display()), "en-US", "mp3")
            .await
            .unwrap();

        let poll = wait_terminal(&client, &handle).await;
        assert_eq!(poll.status, JobStatus::Completed);

        let locator = poll.result_locator.unwrap();
        let path = locator.strip_prefix("file://").unwrap().to_string();
        let doc: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(
            doc["results"]["transcripts"][0]["transcript"],
            "hello from whisper"
        );

        client.release(&handle).await;
        assert!(!Path::new(&path).exists());
    }

    #[tokio::test]
    async fn test_nonzero_exit_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "echo 'model not found' >&2\nexit 3\n");
        let audio = dir.path().join("lecture.mp3");
        std::fs::write(&audio, b"audio").unwrap();

        let client = LocalWhisperClient::new(script, "base");
        let handle = client
            .submit(&format!("file://{}", audio.display()), "en-US", "mp3")
            .await
            .unwrap();

        let poll = wait_terminal(&client, &handle).await;
        assert_eq!(poll.status, JobStatus::Failed);
        assert!(poll.failure_reason.unwrap().contains("model not found"));
    }

    #[tokio::test]
    async fn test_submit_rejects_remote_locator() {
        let client = LocalWhisperClient::new("whisper", "base");
        let result = client.submit("s3://bucket/audio/a.mp3", "en-US", "mp3").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_language_mapping() {
        assert_eq!(whisper_language("en-US"), "en");
        assert_eq!(whisper_language("pt_BR"), "pt");
        assert_eq!(whisper_language("fr"), "fr");
    }
}
