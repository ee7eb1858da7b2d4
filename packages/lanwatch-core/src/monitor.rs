//! The poll/diff loop: repeated client-list snapshots become join and
//! leave transitions.
//!
//! One cycle is fetch -> parse -> diff -> notify, run strictly
//! sequentially; the known set is replaced wholesale at the end of
//! every cycle, so a device that vanishes and returns is a brand-new
//! join. Nothing is persisted: a restart bootstraps silently from the
//! first snapshot.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;

use crate::error::Error;
use crate::notify::Notifier;
use crate::parser::{self, DeviceRecord};
use crate::router::DeviceSource;

/// Decide whether a newly observed address should be reported.
///
/// Pure policy: an empty watch list means "notify everything";
/// otherwise membership decides, case-insensitively. `monitored`
/// entries are expected lowercased.
pub fn should_notify(mac: &str, monitored: &HashSet<String>) -> bool {
    monitored.is_empty() || monitored.contains(&mac.to_ascii_lowercase())
}

/// Outcome of one completed poll cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// True for the first cycle of the monitor's lifetime, which only
    /// seeds the known set and never notifies.
    pub bootstrap: bool,
    /// Devices present in this snapshot.
    pub devices: Vec<DeviceRecord>,
    /// Records that joined since the previous snapshot.
    pub joined: Vec<DeviceRecord>,
    /// Addresses the notifier was invoked for (lowercased). Order is
    /// unspecified.
    pub notified: Vec<String>,
    /// Number of addresses that disappeared since the previous snapshot.
    pub departed: usize,
}

/// The polling state machine. Owns the known-address and
/// monitored-address sets exclusively; nothing else mutates them.
pub struct Monitor {
    source: Box<dyn DeviceSource>,
    notifier: Box<dyn Notifier>,
    /// Addresses believed connected as of the last completed cycle.
    known: HashSet<String>,
    /// Configured watch list; empty means notify on every join.
    monitored: HashSet<String>,
    bootstrapped: bool,
}

impl Monitor {
    pub fn new(
        source: Box<dyn DeviceSource>,
        notifier: Box<dyn Notifier>,
        monitored_macs: &[String],
    ) -> Self {
        Self {
            source,
            notifier,
            known: HashSet::new(),
            monitored: monitored_macs
                .iter()
                .map(|mac| mac.to_ascii_lowercase())
                .collect(),
            bootstrapped: false,
        }
    }

    /// Authenticate with the device source. A rejection here is fatal:
    /// the monitor must not start against an endpoint it cannot read.
    pub async fn login(&mut self) -> Result<()> {
        if !self.source.login().await? {
            return Err(Error::LoginRejected.into());
        }
        tracing::info!("logged in to router");
        Ok(())
    }

    /// Run one fetch -> parse -> diff -> notify cycle.
    ///
    /// Fetch and parse failures degrade the cycle to an empty snapshot
    /// and never propagate. The known set equals the latest snapshot
    /// once this returns.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let body = match self.source.fetch_clients().await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("fetch failed, treating snapshot as empty: {e:#}");
                String::new()
            }
        };

        let devices = parser::parse(&body);
        let current: HashSet<String> = devices
            .iter()
            .map(|d| d.mac.to_ascii_lowercase())
            .collect();

        if !self.bootstrapped {
            tracing::info!("initial snapshot: {} devices", current.len());
            self.known = current;
            self.bootstrapped = true;
            return CycleReport {
                bootstrap: true,
                devices,
                ..CycleReport::default()
            };
        }

        let mut joined = Vec::new();
        let mut notified = Vec::new();
        // Iteration order over simultaneous joins is unspecified.
        for mac in current.difference(&self.known) {
            let Some(record) = devices.iter().find(|d| d.mac.eq_ignore_ascii_case(mac)) else {
                continue;
            };
            if should_notify(mac, &self.monitored) {
                tracing::info!("new device detected: {mac}");
                if let Err(e) = self.notifier.notify(record).await {
                    tracing::error!("notification for {mac} failed: {e:#}");
                }
                notified.push(mac.clone());
            } else {
                tracing::debug!("new device {mac} is not on the watch list");
            }
            joined.push(record.clone());
        }

        let departed = self.known.difference(&current).count();
        if departed > 0 {
            tracing::info!("{departed} devices disconnected");
        }

        self.known = current;
        CycleReport {
            bootstrap: false,
            devices,
            joined,
            notified,
            departed,
        }
    }

    /// Single-run mode: log in, seed the known set from a bootstrap
    /// snapshot, then run exactly one diff cycle and return its report.
    pub async fn run_single(&mut self) -> Result<CycleReport> {
        self.login().await?;
        self.run_cycle().await;
        Ok(self.run_cycle().await)
    }

    /// Continuous mode: log in, bootstrap, then poll every
    /// `poll_interval` until `shutdown` fires. Cancellation is only
    /// observed between cycles, never mid-cycle, so the known set is
    /// always consistent when this returns.
    pub async fn run(
        &mut self,
        poll_interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        self.login().await?;
        self.run_cycle().await;

        loop {
            tokio::select! {
                _ = tokio::time::sleep(poll_interval) => {
                    self.run_cycle().await;
                }
                _ = shutdown.changed() => {
                    tracing::info!("shutdown requested, stopping monitor");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Addresses currently believed connected (lowercased).
    pub fn known_addresses(&self) -> &HashSet<String> {
        &self.known
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use anyhow::anyhow;
    use async_trait::async_trait;

    use super::*;

    struct ScriptedSource {
        login_ok: bool,
        bodies: VecDeque<Result<String>>,
    }

    #[async_trait]
    impl DeviceSource for ScriptedSource {
        async fn login(&mut self) -> Result<bool> {
            Ok(self.login_ok)
        }

        async fn fetch_clients(&mut self) -> Result<String> {
            self.bodies.pop_front().unwrap_or_else(|| Ok(String::new()))
        }
    }

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        delivered: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl RecordingNotifier {
        fn delivered(&self) -> Vec<String> {
            self.delivered.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, device: &DeviceRecord) -> Result<()> {
            self.delivered.lock().unwrap().push(device.mac.clone());
            if self.fail {
                return Err(anyhow!("delivery refused"));
            }
            Ok(())
        }
    }

    fn body(macs: &[&str]) -> Result<String> {
        let clients: Vec<_> = macs
            .iter()
            .map(|mac| serde_json::json!({ "mac": mac }))
            .collect();
        Ok(serde_json::json!({ "clients": clients }).to_string())
    }

    fn scripted(bodies: Vec<Result<String>>, monitored: &[String]) -> (Monitor, RecordingNotifier) {
        let notifier = RecordingNotifier::default();
        let source = ScriptedSource {
            login_ok: true,
            bodies: bodies.into(),
        };
        let monitor = Monitor::new(Box::new(source), Box::new(notifier.clone()), monitored);
        (monitor, notifier)
    }

    fn lower_set(macs: &[&str]) -> HashSet<String> {
        macs.iter().map(|m| m.to_ascii_lowercase()).collect()
    }

    #[tokio::test]
    async fn test_bootstrap_seeds_without_notifying() {
        let (mut monitor, notifier) = scripted(
            vec![body(&["AA:BB:CC:DD:EE:FF", "11:22:33:44:55:66"])],
            &[],
        );
        let report = monitor.run_cycle().await;

        assert!(report.bootstrap);
        assert!(notifier.delivered().is_empty());
        assert_eq!(
            *monitor.known_addresses(),
            lower_set(&["aa:bb:cc:dd:ee:ff", "11:22:33:44:55:66"])
        );
    }

    #[tokio::test]
    async fn test_detects_single_join() {
        let (mut monitor, notifier) = scripted(
            vec![
                body(&["AA:BB:CC:DD:EE:FF"]),
                body(&["AA:BB:CC:DD:EE:FF", "11:22:33:44:55:66"]),
            ],
            &[],
        );
        monitor.run_cycle().await;
        let report = monitor.run_cycle().await;

        assert_eq!(notifier.delivered(), vec!["11:22:33:44:55:66"]);
        assert_eq!(report.notified, vec!["11:22:33:44:55:66"]);
        assert_eq!(
            *monitor.known_addresses(),
            lower_set(&["aa:bb:cc:dd:ee:ff", "11:22:33:44:55:66"])
        );
    }

    #[tokio::test]
    async fn test_watch_list_filters_notifications() {
        let (mut monitor, notifier) = scripted(
            vec![
                body(&[]),
                body(&["AA:BB:CC:DD:EE:FF", "11:22:33:44:55:66"]),
            ],
            &["AA:BB:CC:DD:EE:FF".to_string()],
        );
        monitor.run_cycle().await;
        let report = monitor.run_cycle().await;

        assert_eq!(notifier.delivered(), vec!["AA:BB:CC:DD:EE:FF"]);
        // Both joined, only the monitored one was reported.
        assert_eq!(report.joined.len(), 2);
        assert_eq!(report.notified, vec!["aa:bb:cc:dd:ee:ff"]);
    }

    #[tokio::test]
    async fn test_disconnections_shrink_known_set() {
        let (mut monitor, _notifier) = scripted(
            vec![
                body(&["AA:BB:CC:DD:EE:FF", "11:22:33:44:55:66", "22:33:44:55:66:77"]),
                body(&["11:22:33:44:55:66"]),
            ],
            &[],
        );
        monitor.run_cycle().await;
        let report = monitor.run_cycle().await;

        assert_eq!(report.departed, 2);
        assert_eq!(*monitor.known_addresses(), lower_set(&["11:22:33:44:55:66"]));
    }

    #[tokio::test]
    async fn test_reconnection_notifies_again() {
        let (mut monitor, notifier) = scripted(
            vec![
                body(&["AA:BB:CC:DD:EE:FF", "11:22:33:44:55:66"]),
                body(&["AA:BB:CC:DD:EE:FF"]),
                body(&["AA:BB:CC:DD:EE:FF", "11:22:33:44:55:66"]),
            ],
            &[],
        );
        monitor.run_cycle().await;
        monitor.run_cycle().await;
        monitor.run_cycle().await;

        assert_eq!(notifier.delivered(), vec!["11:22:33:44:55:66"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_empty_snapshot() {
        let (mut monitor, notifier) = scripted(
            vec![body(&["AA:BB:CC:DD:EE:FF"]), Err(anyhow!("connection refused"))],
            &[],
        );
        monitor.run_cycle().await;
        let report = monitor.run_cycle().await;

        assert!(notifier.delivered().is_empty());
        assert_eq!(report.departed, 1);
        assert!(monitor.known_addresses().is_empty());
    }

    #[tokio::test]
    async fn test_notification_failure_still_marks_known() {
        let notifier = RecordingNotifier {
            fail: true,
            ..RecordingNotifier::default()
        };
        let source = ScriptedSource {
            login_ok: true,
            bodies: vec![body(&[]), body(&["AA:BB:CC:DD:EE:FF"])].into(),
        };
        let mut monitor = Monitor::new(Box::new(source), Box::new(notifier.clone()), &[]);

        monitor.run_cycle().await;
        let report = monitor.run_cycle().await;

        assert_eq!(notifier.delivered(), vec!["AA:BB:CC:DD:EE:FF"]);
        assert_eq!(report.notified, vec!["aa:bb:cc:dd:ee:ff"]);
        assert_eq!(*monitor.known_addresses(), lower_set(&["aa:bb:cc:dd:ee:ff"]));
    }

    #[tokio::test]
    async fn test_duplicate_addresses_collapse() {
        let (mut monitor, _notifier) = scripted(
            vec![body(&["AA:BB:CC:DD:EE:FF", "aa:bb:cc:dd:ee:ff"])],
            &[],
        );
        monitor.run_cycle().await;
        assert_eq!(monitor.known_addresses().len(), 1);
    }

    #[tokio::test]
    async fn test_simultaneous_joins_notify_as_a_set() {
        let (mut monitor, notifier) = scripted(
            vec![
                body(&[]),
                body(&["AA:BB:CC:DD:EE:FF", "11:22:33:44:55:66", "22:33:44:55:66:77"]),
            ],
            &[],
        );
        monitor.run_cycle().await;
        let report = monitor.run_cycle().await;

        // Order is unspecified; compare as sets.
        let delivered: HashSet<String> = notifier.delivered().into_iter().collect();
        let expected: HashSet<String> = ["AA:BB:CC:DD:EE:FF", "11:22:33:44:55:66", "22:33:44:55:66:77"]
            .iter()
            .map(|m| m.to_string())
            .collect();
        assert_eq!(delivered, expected);
        assert_eq!(report.notified.len(), 3);
    }

    #[tokio::test]
    async fn test_run_single_is_bootstrap_plus_one_diff() {
        let (mut monitor, notifier) = scripted(
            vec![
                body(&["AA:BB:CC:DD:EE:FF"]),
                body(&["AA:BB:CC:DD:EE:FF", "11:22:33:44:55:66"]),
            ],
            &[],
        );
        let report = monitor.run_single().await.unwrap();

        assert!(!report.bootstrap);
        assert_eq!(report.joined.len(), 1);
        assert_eq!(notifier.delivered(), vec!["11:22:33:44:55:66"]);
    }

    #[tokio::test]
    async fn test_rejected_login_is_fatal() {
        let source = ScriptedSource {
            login_ok: false,
            bodies: VecDeque::new(),
        };
        let mut monitor = Monitor::new(
            Box::new(source),
            Box::new(RecordingNotifier::default()),
            &[],
        );

        let err = monitor.run_single().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::LoginRejected)
        ));
    }

    #[test]
    fn test_should_notify_policy() {
        let empty = HashSet::new();
        assert!(should_notify("aa:bb:cc:dd:ee:ff", &empty));

        let monitored = lower_set(&["AA:BB:CC:DD:EE:FF"]);
        assert!(should_notify("aa:bb:cc:dd:ee:ff", &monitored));
        assert!(should_notify("AA:BB:CC:DD:EE:FF", &monitored));
        assert!(!should_notify("11:22:33:44:55:66", &monitored));
    }
}
