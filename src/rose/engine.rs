use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::rose::flower::{BakedRose, build_rose};

pub enum RoseCommand {
    Grow,
    Stop,
}

pub enum RoseResult {
    Grown(BakedRose),
    Error(String),
}

pub struct RoseEngine {
    tx_cmd: Sender<RoseCommand>,
    // Dropped before joining so a worker blocked on a full result channel
    // sees the disconnect and exits.
    rx_result: Option<Receiver<RoseResult>>,
    last_error: Arc<Mutex<Option<String>>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl RoseEngine {
    /// Spawns the generator thread. With a seed, successive grows follow one
    /// reproducible sequence; without, each run draws from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let (tx_cmd, rx_cmd) = channel::unbounded::<RoseCommand>();
        let (tx_result, rx_result) = channel::bounded::<RoseResult>(2);
        let last_error = Arc::new(Mutex::new(None));
        let last_error_clone = Arc::clone(&last_error);

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let thread_handle = thread::Builder::new()
            .name("rose-engine".into())
            .spawn(move || rose_thread(rx_cmd, tx_result, last_error_clone, rng))
            .map_err(|e| tracing::error!("failed to spawn rose engine: {e}"))
            .ok();

        Self {
            tx_cmd,
            rx_result: Some(rx_result),
            last_error,
            thread_handle,
        }
    }

    pub fn grow(&self) {
        let _ = self.tx_cmd.send(RoseCommand::Grow);
    }

    pub fn try_recv_result(&self) -> Option<RoseResult> {
        self.rx_result.as_ref()?.try_recv().ok()
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    pub fn stop(&self) {
        let _ = self.tx_cmd.send(RoseCommand::Stop);
    }
}

impl Drop for RoseEngine {
    fn drop(&mut self) {
        let _ = self.tx_cmd.send(RoseCommand::Stop);
        self.rx_result = None;
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

fn rose_thread(
    rx_cmd: Receiver<RoseCommand>,
    tx_result: Sender<RoseResult>,
    last_error: Arc<Mutex<Option<String>>>,
    mut rng: StdRng,
) {
    loop {
        let cmd = match rx_cmd.recv() {
            Ok(c) => c,
            Err(_) => return,
        };

        match cmd {
            RoseCommand::Grow => {
                *last_error.lock() = None;
                let started = Instant::now();

                match build_rose(&mut rng) {
                    Ok(group) => {
                        let baked = group.bake();
                        tracing::debug!(
                            vertices = baked.vertices.len(),
                            triangles = baked.triangle_count(),
                            elapsed_ms = started.elapsed().as_secs_f32() * 1000.0,
                            "rose grown"
                        );
                        if tx_result.send(RoseResult::Grown(baked)).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        let e = e.to_string();
                        tracing::warn!("rose generation failed: {e}");
                        *last_error.lock() = Some(e.clone());
                        if tx_result.send(RoseResult::Error(e)).is_err() {
                            return;
                        }
                    }
                }
            }
            RoseCommand::Stop => return,
        }
    }
}
