//! 요청 간 최소 간격 게이트.
//!
//! 업스트림 rate limit 보호를 위한 고정 간격 페이싱을 제공합니다.
//! 적응형이 아니며 실패 시 backoff 하지 않습니다. 정책을 호출
//! 루프에서 분리해 간격을 독립적으로 테스트/조정할 수 있습니다.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// 최소 간격 게이트.
///
/// `wait()`가 반환된 시점 사이에 항상 설정된 간격 이상이 경과합니다.
/// 배치의 첫 요청 전에도 전체 간격을 대기합니다.
#[derive(Debug)]
pub struct MinIntervalGate {
    interval: Duration,
    last_release: Mutex<Option<Instant>>,
}

impl MinIntervalGate {
    /// 주어진 최소 간격으로 게이트를 생성합니다.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_release: Mutex::new(None),
        }
    }

    /// 설정된 간격 반환.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 간격이 경과할 때까지 대기합니다.
    ///
    /// 첫 호출은 전체 간격을 대기하고, 이후 호출은 직전 통과
    /// 시점부터 간격이 차도록 필요한 만큼만 대기합니다.
    pub async fn wait(&self) {
        let mut last = self.last_release.lock().await;

        let release_at = match *last {
            Some(prev) => prev + self.interval,
            None => Instant::now() + self.interval,
        };

        tokio::time::sleep_until(release_at).await;
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_wait_takes_full_interval() {
        let gate = MinIntervalGate::new(Duration::from_millis(300));

        let start = Instant::now();
        gate.wait().await;

        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_successive_waits_are_spaced() {
        let gate = MinIntervalGate::new(Duration::from_millis(300));

        gate.wait().await;
        let first_release = Instant::now();

        gate.wait().await;
        let second_release = Instant::now();

        assert!(second_release - first_release >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_time_counts_toward_interval() {
        let gate = MinIntervalGate::new(Duration::from_millis(300));

        gate.wait().await;
        // 간격의 일부가 이미 경과한 상태
        tokio::time::sleep(Duration::from_millis(200)).await;

        let before = Instant::now();
        gate.wait().await;

        // 남은 100ms 근처만 추가로 대기
        let waited = before.elapsed();
        assert!(waited >= Duration::from_millis(100));
        assert!(waited < Duration::from_millis(300));
    }
}
