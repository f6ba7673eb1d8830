use std::thread;
use std::time::Duration;

use rescue_core::{ControlRequest, Effect, TabId};
use rescue_engine::EngineHandle;
use rescue_logging::rescue_info;

/// Carries out status-page effects, through the engine when one is attached.
pub struct EffectRunner<'a> {
    engine: Option<&'a EngineHandle>,
    tab_id: TabId,
    redirect_delay: Duration,
}

impl<'a> EffectRunner<'a> {
    pub fn attached(engine: &'a EngineHandle, tab_id: TabId) -> Self {
        Self {
            engine: Some(engine),
            tab_id,
            redirect_delay: Duration::ZERO,
        }
    }

    /// A page without a controller; it performs its own redirect.
    pub fn detached(tab_id: TabId, redirect_delay: Duration) -> Self {
        Self {
            engine: None,
            tab_id,
            redirect_delay,
        }
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Navigate { url } => {
                    rescue_info!("Returning tab {} to {}", self.tab_id, url);
                    self.send(ControlRequest::ReturnToOriginal { url });
                }
                Effect::CloseTab => self.send(ControlRequest::CloseTab),
                Effect::ScheduleRedirect { archived_url } => {
                    println!(
                        "Redirecting to {} in {} ms",
                        archived_url,
                        self.redirect_delay.as_millis()
                    );
                    thread::sleep(self.redirect_delay);
                    println!("-> tab {}: {}", self.tab_id, archived_url);
                }
            }
        }
    }

    fn send(&self, request: ControlRequest) {
        match self.engine {
            Some(engine) => engine.control(self.tab_id, request),
            None => match request {
                ControlRequest::ReturnToOriginal { url } => {
                    println!("-> tab {}: {}", self.tab_id, url)
                }
                ControlRequest::CloseTab => println!("-> tab {} closed", self.tab_id),
            },
        }
    }
}
