//! Worker pipeline tests driven by a scripted engine.

use insectiscan::Error;
use insectiscan::constants::MODEL_ASSET_NAME;
use insectiscan::imaging::Bitmap;
use insectiscan::inference::{
    AssetBundle, Engine, EngineLoader, EngineState, ModelSession, SessionOptions,
    check_input_layout,
};
use insectiscan::pipeline::{ViewLifetime, spawn_worker};
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::mpsc;

const SCORES: [f32; 5] = [0.05, 0.05, 0.1, 0.1, 0.7];
const INPUT_SHAPE: [usize; 4] = [1, 224, 224, 3];

/// Engine whose forward pass waits for the test to release it.
struct GatedEngine {
    input: Vec<f32>,
    started: mpsc::UnboundedSender<()>,
    gate: Arc<Mutex<std_mpsc::Receiver<()>>>,
    ran: bool,
}

impl Engine for GatedEngine {
    fn allocate_tensors(&mut self) -> insectiscan::Result<()> {
        self.input = vec![0.0; 224 * 224 * 3];
        Ok(())
    }

    fn input_shape(&self) -> Option<&[usize]> {
        Some(&INPUT_SHAPE)
    }

    fn copy_input(&mut self, shape: &[usize], values: &[f32]) -> insectiscan::Result<()> {
        check_input_layout(&INPUT_SHAPE, shape, values)?;
        self.input.copy_from_slice(values);
        Ok(())
    }

    fn invoke(&mut self) -> insectiscan::Result<()> {
        let _ = self.started.send(());
        let gate = self.gate.lock().map_err(|_| Error::InvokeFailure {
            reason: "gate poisoned".to_string(),
        })?;
        gate.recv().map_err(|_| Error::InvokeFailure {
            reason: "gate closed".to_string(),
        })?;
        self.ran = true;
        Ok(())
    }

    fn output(&self) -> insectiscan::Result<Vec<f32>> {
        if self.ran {
            Ok(SCORES.to_vec())
        } else {
            Err(Error::OutputReadError {
                reason: "no pass".to_string(),
            })
        }
    }
}

struct GatedLoader {
    started: mpsc::UnboundedSender<()>,
    gate: Arc<Mutex<std_mpsc::Receiver<()>>>,
}

impl EngineLoader for GatedLoader {
    fn load(&self, _name: &str, _model: &[u8]) -> insectiscan::Result<Box<dyn Engine>> {
        Ok(Box::new(GatedEngine {
            input: Vec::new(),
            started: self.started.clone(),
            gate: Arc::clone(&self.gate),
            ran: false,
        }))
    }
}

struct Harness {
    _bundle_dir: TempDir,
    session: Arc<ModelSession>,
    started: mpsc::UnboundedReceiver<()>,
    release: std_mpsc::Sender<()>,
}

fn harness() -> Harness {
    let bundle_dir = TempDir::new().expect("temp dir");
    std::fs::write(bundle_dir.path().join(MODEL_ASSET_NAME), b"model").expect("write model");

    let (started_tx, started_rx) = mpsc::unbounded_channel();
    let (release_tx, release_rx) = std_mpsc::channel();
    let loader = GatedLoader {
        started: started_tx,
        gate: Arc::new(Mutex::new(release_rx)),
    };

    let mut session = ModelSession::new(SessionOptions::default());
    session
        .load(&AssetBundle::new(bundle_dir.path()), &loader)
        .expect("load");
    assert_eq!(session.state(), EngineState::Ready);

    Harness {
        _bundle_dir: bundle_dir,
        session: Arc::new(session),
        started: started_rx,
        release: release_tx,
    }
}

fn photo() -> Bitmap {
    Bitmap::from_rgba(4, 4, vec![90; 4 * 4 * 4]).expect("bitmap")
}

#[tokio::test]
async fn test_result_delivered_to_live_view() {
    let mut h = harness();
    let (worker, join) = spawn_worker(Arc::clone(&h.session), 4);
    let view = ViewLifetime::new();

    let pending = worker.submit(photo(), view.token()).await.expect("submit");
    h.started.recv().await.expect("pass started");
    h.release.send(()).expect("release gate");

    let classification = pending.wait().await.expect("classification");
    assert_eq!(classification.top.label, "Tick");
    assert_eq!(classification.top.to_string(), "Likely: Tick (70%)");

    drop(worker);
    let stats = join.await.expect("worker join");
    assert_eq!(stats.delivered, 1);
    assert_eq!(stats.discarded, 0);
}

#[tokio::test]
async fn test_result_discarded_when_view_torn_down_mid_flight() {
    let mut h = harness();
    let (worker, join) = spawn_worker(Arc::clone(&h.session), 4);
    let view = ViewLifetime::new();

    let pending = worker.submit(photo(), view.token()).await.expect("submit");
    h.started.recv().await.expect("pass started");

    drop(view);
    h.release.send(()).expect("release gate");

    assert!(matches!(pending.wait().await, Err(Error::Discarded)));

    drop(worker);
    let stats = join.await.expect("worker join");
    assert_eq!(stats.delivered, 0);
    assert_eq!(stats.discarded, 1);
}

#[tokio::test]
async fn test_request_from_dead_view_is_never_run() {
    let mut h = harness();
    let (worker, join) = spawn_worker(Arc::clone(&h.session), 4);

    let view = ViewLifetime::new();
    let token = view.token();
    drop(view);

    let pending = worker.submit(photo(), token).await.expect("submit");
    assert!(matches!(pending.wait().await, Err(Error::Discarded)));

    drop(worker);
    let stats = join.await.expect("worker join");
    assert_eq!(stats.discarded, 1);
    // The gated engine was never entered.
    assert!(h.started.try_recv().is_err());
}

#[tokio::test]
async fn test_not_ready_session_reports_through_worker() {
    let session = Arc::new(ModelSession::new(SessionOptions::default()));
    let (worker, _join) = spawn_worker(session, 1);
    let view = ViewLifetime::new();

    let pending = worker.submit(photo(), view.token()).await.expect("submit");
    assert!(matches!(
        pending.wait().await,
        Err(Error::NotReady {
            state: EngineState::Unloaded
        })
    ));
}
