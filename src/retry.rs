/// Retry with linear backoff, and directory removal built on it.
///
/// Right after an archive is extracted or its contents moved, some platforms
/// keep file handles open for a moment and deleting the working directory
/// fails. [`SafeRemover`] retries the deletion a few times and, if it still
/// fails, logs it and moves on: a leftover temporary directory must never
/// fail a batch.
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;

/// How many times to try an operation and how long to wait between tries.
///
/// The wait before retry `n` (1-based attempt that just failed) is
/// `n * delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of calls, including the first one.
    pub max_attempts: u32,
    /// Base delay, multiplied by the attempt number.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given attempts and base delay.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Backoff to wait after `attempt` failed.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.delay * attempt
    }

    /// Runs `operation` until it succeeds or the attempts are exhausted.
    ///
    /// Returns the last error when every attempt failed. A policy with
    /// `max_attempts == 0` still calls the operation once.
    ///
    /// # Examples
    ///
    /// ```
    /// use hemeroteca::retry::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::new(3, Duration::ZERO);
    /// let mut calls = 0;
    /// let result: Result<u32, String> = policy.run("count", || {
    ///     calls += 1;
    ///     if calls < 2 { Err("busy".to_string()) } else { Ok(calls) }
    /// });
    /// assert_eq!(result, Ok(2));
    /// ```
    pub fn run<T, E, F>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        E: Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match operation() {
                Ok(value) => {
                    if attempt > 1 {
                        log::debug!("{} succeeded on attempt {}", label, attempt);
                    }
                    return Ok(value);
                }
                Err(e) if attempt >= max_attempts => {
                    log::debug!("{} failed after {} attempts: {}", label, attempt, e);
                    return Err(e);
                }
                Err(e) => {
                    let wait = self.backoff(attempt);
                    log::debug!(
                        "{} attempt {}/{} failed: {}. Retrying in {:?}",
                        label,
                        attempt,
                        max_attempts,
                        e,
                        wait
                    );
                    thread::sleep(wait);
                    attempt += 1;
                }
            }
        }
    }
}

/// Deletes directories, retrying while the OS still holds handles open.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafeRemover {
    policy: RetryPolicy,
}

impl SafeRemover {
    /// Creates a remover using the given retry policy.
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Removes `path` and everything below it.
    ///
    /// Never fails: a path that does not exist counts as removed, and a
    /// removal that keeps failing is logged as a warning.
    pub fn remove_directory(&self, path: &Path) -> bool {
        self.remove_directory_with(path, |p| fs::remove_dir_all(p))
    }

    /// Like [`remove_directory`](Self::remove_directory) with a custom removal
    /// operation. Returns whether the directory is gone.
    pub fn remove_directory_with<F>(&self, path: &Path, mut remove: F) -> bool
    where
        F: FnMut(&Path) -> io::Result<()>,
    {
        let label = format!("remove {}", path.display());
        let result = self.policy.run(&label, || match remove(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        });

        match result {
            Ok(()) => true,
            Err(e) => {
                log::warn!(
                    "Could not remove temporary directory {} after {} attempts: {}",
                    path.display(),
                    self.policy.max_attempts.max(1),
                    e
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn instant(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO)
    }

    #[test]
    fn test_run_succeeds_first_attempt() {
        let mut calls = 0;
        let result: Result<i32, String> = instant(3).run("op", || {
            calls += 1;
            Ok(42)
        });
        assert_eq!(result, Ok(42));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_run_returns_last_error() {
        let mut calls = 0;
        let result: Result<(), String> = instant(4).run("op", || {
            calls += 1;
            Err(format!("failure {}", calls))
        });
        assert_eq!(result, Err("failure 4".to_string()));
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_zero_attempts_still_runs_once() {
        let mut calls = 0;
        let _: Result<(), &str> = instant(0).run("op", || {
            calls += 1;
            Err("nope")
        });
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_backoff_is_linear() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100));
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(3), Duration::from_millis(300));
    }

    #[test]
    fn test_remove_directory_always_failing_is_called_max_attempts_times() {
        let remover = SafeRemover::new(instant(5));
        let mut calls = 0;
        let removed = remover.remove_directory_with(Path::new("/locked"), |_| {
            calls += 1;
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "in use"))
        });
        assert!(!removed);
        assert_eq!(calls, 5);
    }

    #[test]
    fn test_remove_directory_recovers_after_transient_failure() {
        let remover = SafeRemover::new(instant(5));
        let mut calls = 0;
        let removed = remover.remove_directory_with(Path::new("/busy"), |_| {
            calls += 1;
            if calls < 3 {
                Err(io::Error::other("busy"))
            } else {
                Ok(())
            }
        });
        assert!(removed);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_remove_directory_missing_path_counts_as_removed() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let remover = SafeRemover::new(instant(2));
        assert!(remover.remove_directory(&temp_dir.path().join("gone")));
    }

    #[test]
    fn test_remove_directory_removes_tree() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let work = temp_dir.path().join("work");
        fs::create_dir_all(work.join("nested")).expect("Failed to create dirs");
        fs::write(work.join("nested").join("page.jpg"), b"x").expect("Failed to write file");

        assert!(SafeRemover::default().remove_directory(&work));
        assert!(!work.exists());
    }
}
