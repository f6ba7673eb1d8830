use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use rescue_core::{
    parse_status_page_url, select_winner, status_page_url, update, url_variants, LookupResult, Msg, NavigationError, NavigationSignal,
    ResourceType, ResponseCompleted, SearchState, StatusPage, StatusUpdate, TabId, Winner,
    TOP_LEVEL_FRAME,
};
use rescue_engine::{
    EngineEvent, EngineHandle, RecoveryWorkflow, ReqwestArchiveLookup, WorkflowOutcome,
};
use rescue_logging::{rescue_debug, rescue_info, rescue_warn};

use super::config::RescueConfig;
use super::effects::EffectRunner;
use super::host::TerminalHost;
use super::render::{render, render_progress};

const TICK_INTERVAL: Duration = Duration::from_millis(150);
const CONTROL_TIMEOUT: Duration = Duration::from_secs(5);

/// How the simulated navigation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulatedFailure {
    HttpStatus(u16),
    NetworkError(String),
}

#[derive(Debug, Clone)]
pub struct RescueRequest {
    pub url: String,
    pub tab_id: TabId,
    pub failure: SimulatedFailure,
    /// Press "close" on a persistent notice once the rescue ends.
    pub dismiss: bool,
}

impl RescueRequest {
    /// The signals a browser would deliver for this failure, in order.
    pub fn signals(&self) -> Vec<NavigationSignal> {
        match &self.failure {
            SimulatedFailure::HttpStatus(status) => vec![
                NavigationSignal::ResponseCompleted(ResponseCompleted {
                    tab_id: self.tab_id,
                    url: self.url.clone(),
                    status: *status,
                    resource: ResourceType::MainFrame,
                }),
                NavigationSignal::NavigationCompleted {
                    tab_id: self.tab_id,
                    frame_id: TOP_LEVEL_FRAME,
                },
            ],
            SimulatedFailure::NetworkError(error) => {
                vec![NavigationSignal::NavigationError(NavigationError {
                    tab_id: self.tab_id,
                    frame_id: TOP_LEVEL_FRAME,
                    url: self.url.clone(),
                    error: error.clone(),
                })]
            }
        }
    }
}

/// Prints the URLs a rescue of `url` would check, in priority order.
pub fn print_variants(url: &str) {
    for (index, variant) in url_variants(url).iter().enumerate() {
        println!("{:>2}. {}", index + 1, variant);
    }
}

/// Queries the archive for every variant of `url` without touching any tab.
pub fn run_lookup(config: &RescueConfig, url: &str) -> Result<Option<Winner>> {
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let lookup = Arc::new(ReqwestArchiveLookup::new(config.engine_settings().lookup)?);
    let workflow = RecoveryWorkflow::new(lookup, Arc::new(TerminalHost::new()), config.timings());

    let variants = url_variants(url);
    rescue_debug!("Looking up {} variants of {}", variants.len(), url);
    let results = runtime.block_on(workflow.check_variants(&variants));
    for line in lookup_report(&results) {
        println!("{line}");
    }
    let archived = results.iter().filter(|result| result.is_found()).count();
    rescue_info!("{} of {} variants are archived", archived, results.len());

    let winner = select_winner(&results);
    match &winner {
        Some(winner) => println!("Best match: {} -> {}", winner.variant, winner.archived_url),
        None => println!("No archived version of {url}"),
    }
    Ok(winner)
}

fn lookup_report(results: &[LookupResult]) -> Vec<String> {
    results
        .iter()
        .map(|result| match &result.archived_url {
            Some(archived) => format!("  found    {} -> {}", result.variant, archived),
            None => format!("  missing  {}", result.variant),
        })
        .collect()
}

/// Runs one rescue against the configured archive and renders its status page.
///
/// Returns `None` when the detector does not treat the failure as rescuable.
pub fn run_rescue(config: &RescueConfig, request: &RescueRequest) -> Result<Option<WorkflowOutcome>> {
    let host = Arc::new(TerminalHost::new());
    host.open_tab(request.tab_id, &request.url);
    let engine = EngineHandle::new(config.engine_settings(), host.clone(), host.clone())
        .context("failed to start rescue engine")?;
    let runner = EffectRunner::attached(&engine, request.tab_id);

    for signal in request.signals() {
        engine.observe(signal);
    }

    let deadline = Instant::now() + config.rescue_deadline();
    let mut page = StatusPage::new();
    let outcome = loop {
        if Instant::now() >= deadline {
            bail!(
                "rescue of {} did not finish within {:?}",
                request.url,
                config.rescue_deadline()
            );
        }
        match engine.recv_timeout(TICK_INTERVAL) {
            Some(EngineEvent::Detected(event)) => {
                println!("Detected {} for {}", event.cause, event.url);
                let searching = StatusUpdate::new(event.url.as_str(), SearchState::Searching);
                let address = status_page_url(&config.status_page_base, &searching)?;
                println!("Status page: {address}");
            }
            Some(EngineEvent::Status { tab_id, update }) if tab_id == request.tab_id => {
                page = dispatch(page, Msg::StatusReceived(update), &runner);
            }
            Some(EngineEvent::Finished { tab_id, outcome }) if tab_id == request.tab_id => {
                break outcome;
            }
            Some(EngineEvent::Ignored { tab_id }) if tab_id == request.tab_id => {
                println!("{:?} for {} is not rescued", request.failure, request.url);
                return Ok(None);
            }
            Some(other) => rescue_debug!("Ignoring engine event {:?}", other),
            None => {
                let advance = fastrand::u8(1..=8);
                page = dispatch(page, Msg::Tick { advance }, &runner);
            }
        }
    };

    if request.dismiss {
        dismiss(page, &engine, &runner);
    }
    if let Some(url) = host.current_url(request.tab_id) {
        println!("Tab {} now shows {}", request.tab_id, url);
    }
    Ok(Some(outcome))
}

/// Paints a status page from its address, as on first load.
pub fn show_status_page(
    config: &RescueConfig,
    address: &str,
    auto_redirect: bool,
    dismiss: bool,
) -> Result<SearchState> {
    let status = parse_status_page_url(address).context("could not read status page address")?;
    let page = if auto_redirect {
        StatusPage::with_auto_redirect()
    } else {
        StatusPage::new()
    };
    let runner = EffectRunner::detached(1, config.timings().found_delay);

    let page = dispatch(page, Msg::StatusReceived(status), &runner);
    let page = if dismiss {
        dispatch(page, Msg::CloseClicked, &runner)
    } else {
        page
    };
    Ok(page.search_state().clone())
}

/// Applies a message, renders if needed and runs the resulting effects.
fn dispatch(page: StatusPage, msg: Msg, runner: &EffectRunner<'_>) -> StatusPage {
    let is_tick = matches!(msg, Msg::Tick { .. });
    let (mut page, effects) = update(page, msg);
    let view = page.view();
    if page.consume_dirty() {
        if is_tick {
            if let Some(line) = render_progress(&view) {
                println!("{line}");
            }
        } else {
            for line in render(&view) {
                println!("{line}");
            }
        }
    }
    runner.run(effects);
    page
}

fn dismiss(page: StatusPage, engine: &EngineHandle, runner: &EffectRunner<'_>) {
    if page.view().actions.is_empty() {
        return;
    }
    println!("Closing the notice");
    let _ = dispatch(page, Msg::CloseClicked, runner);

    let deadline = Instant::now() + CONTROL_TIMEOUT;
    while Instant::now() < deadline {
        match engine.recv_timeout(TICK_INTERVAL) {
            Some(EngineEvent::ControlHandled { result, .. }) => {
                if let Err(err) = result {
                    rescue_warn!("Close request failed: {}", err);
                }
                return;
            }
            Some(other) => rescue_debug!("Ignoring engine event {:?}", other),
            None => {}
        }
    }
    rescue_warn!("No answer to the close request within {:?}", CONTROL_TIMEOUT);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(failure: SimulatedFailure) -> RescueRequest {
        RescueRequest {
            url: "http://example.com/missing".to_string(),
            tab_id: 1,
            failure,
            dismiss: false,
        }
    }

    #[test]
    fn http_failure_delivers_response_then_completion() {
        let signals = request(SimulatedFailure::HttpStatus(404)).signals();
        assert_eq!(signals.len(), 2);
        assert!(matches!(
            signals[0],
            NavigationSignal::ResponseCompleted(ResponseCompleted { status: 404, .. })
        ));
        assert!(matches!(
            signals[1],
            NavigationSignal::NavigationCompleted { tab_id: 1, .. }
        ));
    }

    #[test]
    fn failures_the_detector_rejects_end_without_waiting() {
        let config = RescueConfig {
            endpoint: "http://127.0.0.1:9/wayback/available".to_string(),
            ..RescueConfig::default()
        };
        let rejected = [
            RescueRequest {
                url: "ftp://example.com/missing".to_string(),
                ..request(SimulatedFailure::HttpStatus(404))
            },
            request(SimulatedFailure::HttpStatus(200)),
            request(SimulatedFailure::NetworkError("net::ERR_ABORTED".to_string())),
            RescueRequest {
                url: "https://web.archive.org/web/2020/http://example.com/".to_string(),
                ..request(SimulatedFailure::HttpStatus(404))
            },
        ];

        for rejected in &rejected {
            let started = Instant::now();
            let outcome = run_rescue(&config, rejected).unwrap();
            assert_eq!(outcome, None, "{rejected:?}");
            assert!(
                started.elapsed() < Duration::from_secs(2),
                "{rejected:?} took {:?}",
                started.elapsed()
            );
        }
    }

    #[test]
    fn lookup_report_marks_each_variant() {
        let results = vec![
            LookupResult::missing("http://example.com/a"),
            LookupResult::found("http://www.example.com/a", "https://web.archive.org/web/1/x"),
        ];
        assert_eq!(
            lookup_report(&results),
            vec![
                "  missing  http://example.com/a".to_string(),
                "  found    http://www.example.com/a -> https://web.archive.org/web/1/x"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn status_page_address_is_painted_and_dismissed() {
        let config = RescueConfig::default();
        let address = format!(
            "{}?state=not-found&url=http%3A%2F%2Fexample.com%2F",
            config.status_page_base
        );
        let state = show_status_page(&config, &address, false, true).unwrap();
        assert_eq!(state, SearchState::NotFound);
    }

    #[test]
    fn unparsable_status_page_address_is_an_error() {
        let config = RescueConfig::default();
        assert!(show_status_page(&config, "not a url", false, false).is_err());
    }
}
