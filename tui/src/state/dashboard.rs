use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use log::{info, warn};

use nn_dashboard::{
    network::{reveal_delay, NodeId, Point},
    prefs::{self, Preferences, PreferencesStore},
    visualizers::{data_flow, Particle, Route},
    DashboardConfig, MetricsGenerator, RunState, Scheduler, Snapshot, Topology, TrainingDriver,
    TrainingEvent, TrainingListener, Visuals,
};

/// Side of the square virtual surface the network is laid out on.
pub const CANVAS_SIZE: f64 = 100.0;
const CANVAS_MARGIN: f64 = 8.0;

const LEARNING_RATE_STEP: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Network,
    Features,
    Attention,
    Confusion,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Network, Tab::Features, Tab::Attention, Tab::Confusion];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Network => "Network",
            Tab::Features => "Feature Maps",
            Tab::Attention => "Attention",
            Tab::Confusion => "Confusion",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

pub enum Action {
    None,
    Quit,
}

/// Where `id` sits on the network canvas: layers spread left to right, units top to bottom.
pub fn node_position(topology: &Topology, id: NodeId) -> Option<Point> {
    let layers = topology.layers();
    let units = layers.get(id.layer)?.units;
    if id.index >= units {
        return None;
    }

    let span = CANVAS_SIZE - 2.0 * CANVAS_MARGIN;
    let x = match layers.len() {
        1 => CANVAS_SIZE / 2.0,
        n => CANVAS_MARGIN + span * id.layer as f64 / (n - 1) as f64,
    };
    let y = CANVAS_SIZE * (units - id.index) as f64 / (units + 1) as f64;
    Some(Point::new(x, y))
}

/// Passes events on to the visuals and keeps the routes of every epoch update,
/// so a poll that runs several ticks spawns particles for each of them.
struct FlowTap<'a> {
    visuals: &'a mut Visuals,
    routes: Vec<Route>,
}

impl TrainingListener for FlowTap<'_> {
    fn on_event(&mut self, event: &TrainingEvent, snapshot: &Snapshot<'_>) {
        self.visuals.on_event(event, snapshot);
        if let TrainingEvent::EpochUpdated { .. } = event {
            self.routes.extend_from_slice(self.visuals.routes());
        }
    }
}

/// Everything the terminal shows: the training driver, its visual listener and the
/// user's preferences.
pub struct Dashboard<S: Scheduler> {
    driver: TrainingDriver<S>,
    visuals: Visuals,
    prefs: Preferences,
    store: Box<dyn PreferencesStore>,
    tab: Tab,
    revealed_at: Option<Instant>,
    particles: Vec<(Particle, Instant)>,
}

impl<S: Scheduler> Dashboard<S> {
    /// Builds the dashboard, restoring the last selected model from `store`.
    ///
    /// # Errors
    /// Returns an error if `config` holds invalid bounds.
    pub fn new(
        config: &DashboardConfig,
        scheduler: S,
        store: Box<dyn PreferencesStore>,
    ) -> anyhow::Result<Self> {
        let prefs = prefs::load(store.as_ref());
        let seed = config.noise_seed();
        let driver = TrainingDriver::new(
            config.driver_config()?,
            prefs.model_type,
            MetricsGenerator::new(Some(seed)),
            scheduler,
        );
        let visuals = Visuals::new(*driver.topology(), config.cadence, seed);
        info!(variant = prefs.model_type.label(), seed; "dashboard ready");

        Ok(Self {
            driver,
            visuals,
            prefs,
            store,
            tab: Tab::Network,
            revealed_at: None,
            particles: Vec::new(),
        })
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        self.driver.snapshot()
    }

    pub fn visuals(&self) -> &Visuals {
        &self.visuals
    }

    pub fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn handle_key(&mut self, key: KeyCode, now: Instant) -> Action {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            KeyCode::Tab => self.tab = self.tab.next(),

            KeyCode::Char('s') => {
                if self.driver.start(&mut self.visuals) {
                    self.revealed_at = Some(now);
                    self.particles.clear();
                }
            }
            KeyCode::Char('p') => {
                self.driver.toggle_pause(&mut self.visuals);
            }
            KeyCode::Char('r') => {
                self.driver.reset(&mut self.visuals);
                self.clear_network();
            }

            KeyCode::Char('m') => {
                let next = self.prefs.model_type.next();
                if self.driver.set_variant(next, &mut self.visuals) {
                    self.clear_network();
                }
                self.prefs.model_type = next;
                self.save_prefs();
            }
            KeyCode::Char('D') => {
                self.prefs.cycle_dataset();
                self.save_prefs();
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.prefs.scale_learning_rate(LEARNING_RATE_STEP);
                self.save_prefs();
            }
            KeyCode::Char('-') => {
                self.prefs.scale_learning_rate(1.0 / LEARNING_RATE_STEP);
                self.save_prefs();
            }
            KeyCode::Char('b') => {
                self.prefs.cycle_batch_size();
                self.save_prefs();
            }
            KeyCode::Char('t') => {
                self.prefs.dark_mode = !self.prefs.dark_mode;
                self.save_prefs();
            }
            _ => {}
        }
        Action::None
    }

    /// Runs due ticks and spawns or retires particles. Called once per frame.
    pub fn update(&mut self, now: Instant) {
        let mut tap = FlowTap {
            visuals: &mut self.visuals,
            routes: Vec::new(),
        };
        self.driver.poll(&mut tap);
        let routes = tap.routes;

        if !routes.is_empty() {
            let topology = *self.visuals.network().topology();
            let spawned = data_flow::place(&routes, |id| node_position(&topology, id));
            self.particles.extend(spawned.into_iter().map(|p| (p, now)));
        }

        self.particles
            .retain(|(p, born)| !p.is_expired(now.saturating_duration_since(*born)));
    }

    /// Fits the loss chart to a panel `cols` cells wide.
    pub fn resize(&mut self, cols: u16) {
        self.visuals.set_chart_width(f64::from(cols));
    }

    /// Number of connections already faded in.
    pub fn revealed_edges(&self, now: Instant) -> usize {
        let total = self.visuals.network().graph().edges.len();
        if self.driver.state() == RunState::Idle {
            return 0;
        }
        let Some(at) = self.revealed_at else {
            return total;
        };
        let elapsed = now.saturating_duration_since(at);
        (0..total)
            .position(|i| reveal_delay(i) > elapsed)
            .unwrap_or(total)
    }

    /// Current particle positions on the canvas.
    pub fn particle_positions(&self, now: Instant) -> Vec<Point> {
        self.particles
            .iter()
            .map(|(p, born)| p.position_at(now.saturating_duration_since(*born)))
            .collect()
    }

    /// Blink phase of the output neurons, flipping every 500 ms.
    pub fn pulse_phase(&self, now: Instant) -> bool {
        let since = self
            .revealed_at
            .map_or(Duration::ZERO, |at| now.saturating_duration_since(at));
        (since.as_millis() / 500) % 2 == 0
    }

    fn clear_network(&mut self) {
        self.revealed_at = None;
        self.particles.clear();
    }

    fn save_prefs(&mut self) {
        if let Err(e) = prefs::save(self.store.as_mut(), &self.prefs) {
            warn!("failed to save preferences: {e}");
        }
    }
}
