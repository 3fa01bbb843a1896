use std::fmt;
use std::time::Duration;

use log::{debug, trace};
use rand::Rng;

use crate::config::{self, SimulationConfig};
use crate::error::{LifeError, Result};
use crate::grid::{Cell, CellState, Grid};
use crate::patterns::Pattern;

/// Ceiling on ticks run by one [`GridSimulation::advance`] call, so a host
/// that stalls (minimised window, suspended machine) does not replay every
/// missed generation in a single frame.
pub const MAX_TICKS_PER_ADVANCE: u32 = 64;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Called with the current generation after every change a renderer should see.
pub type RenderHook = Box<dyn FnMut(&Grid)>;

/// Time accumulated towards the next tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Timer {
    elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Stopped,
    Running(Timer),
}

/// Owns a bounded Game of Life grid and advances it on demand or on a timer.
///
/// The timer is driven by the host: call [`advance`](Self::advance) from the
/// event loop with the time that has passed, and one [`step`](Self::step)
/// fires for every full tick interval while the simulation is running.
pub struct GridSimulation {
    grid: Grid,
    generation: u64,
    tick_interval: Duration,
    run_state: RunState,
    render_hook: Option<RenderHook>,
}

impl GridSimulation {
    pub fn new(width: usize, height: usize, initial: Grid, tick_interval_ms: u64) -> Result<Self> {
        if initial.width() != width || initial.height() != height {
            return Err(LifeError::InvalidDimensions {
                width: initial.width(),
                height: initial.height(),
                reason: format!("initial grid does not match the requested {width}x{height}"),
            });
        }
        let tick_interval = config::tick_interval(tick_interval_ms)?;

        Ok(GridSimulation {
            grid: initial,
            generation: 0,
            tick_interval,
            run_state: RunState::Stopped,
            render_hook: None,
        })
    }

    /// An all-dead simulation sized by `config`.
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let grid = Grid::new(config.width, config.height)?;
        Self::new(config.width, config.height, grid, config.tick_interval_ms)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn is_running(&self) -> bool {
        matches!(self.run_state, RunState::Running(_))
    }

    pub fn set_render_hook(&mut self, hook: impl FnMut(&Grid) + 'static) {
        self.render_hook = Some(Box::new(hook));
    }

    pub fn clear_render_hook(&mut self) {
        self.render_hook = None;
    }

    fn notify(&mut self) {
        if let Some(hook) = self.render_hook.as_mut() {
            hook(&self.grid);
        }
    }

    pub fn neighbors_of(&self, x: usize, y: usize) -> Result<Vec<Cell>> {
        self.grid.neighbors(x, y)
    }

    pub fn alive_neighbor_count(&self, x: usize, y: usize) -> Result<usize> {
        self.grid.alive_neighbors(x, y)
    }

    /// Replaces the current generation with the next one.
    /// Returns whether any cell changed.
    pub fn step(&mut self) -> bool {
        let next = self.grid.next_generation();
        let changed = next != self.grid;
        self.grid = next;
        self.generation += 1;
        trace!("generation {} (changed: {changed})", self.generation);
        self.notify();
        changed
    }

    pub fn toggle_cell(&mut self, x: usize, y: usize) -> Result<CellState> {
        let state = self.grid.toggle(x, y)?;
        self.notify();
        Ok(state)
    }

    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        debug!("starting simulation, tick every {:?}", self.tick_interval);
        self.run_state = RunState::Running(Timer::default());
    }

    pub fn stop(&mut self) {
        if let RunState::Running(_) = self.run_state {
            debug!("stopping simulation at generation {}", self.generation);
            self.run_state = RunState::Stopped;
        }
    }

    /// Play/pause. Returns whether the simulation is now running.
    pub fn toggle_running(&mut self) -> bool {
        if self.is_running() {
            self.stop();
        } else {
            self.start();
        }
        self.is_running()
    }

    /// Changes the tick period. A running timer restarts, so the next tick
    /// comes one full new interval from now.
    pub fn set_tick_interval(&mut self, ms: u64) -> Result<()> {
        self.tick_interval = config::tick_interval(ms)?;
        debug!("tick interval set to {:?}", self.tick_interval);
        if self.is_running() {
            self.run_state = RunState::Running(Timer::default());
        }
        Ok(())
    }

    /// Feeds elapsed host time to the timer and runs the ticks that became
    /// due, at most [`MAX_TICKS_PER_ADVANCE`] of them. Intervals past that
    /// ceiling are dropped, not replayed later. Returns the number of ticks
    /// fired; always 0 while stopped.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        let RunState::Running(timer) = &mut self.run_state else {
            return 0;
        };
        let total = timer.elapsed.saturating_add(elapsed).as_nanos();
        let interval = self.tick_interval.as_nanos();

        let due = total / interval;
        let fired = due.min(u128::from(MAX_TICKS_PER_ADVANCE)) as u32;
        if due > u128::from(fired) {
            debug!("timer fell behind, dropping {} ticks", due - u128::from(fired));
        }
        let remainder = total % interval;
        timer.elapsed = Duration::new(
            (remainder / NANOS_PER_SEC) as u64,
            (remainder % NANOS_PER_SEC) as u32,
        );

        for _ in 0..fired {
            self.step();
        }
        fired
    }

    pub fn clear(&mut self) {
        self.grid.clear();
        self.generation = 0;
        self.notify();
    }

    pub fn randomize(&mut self) {
        self.randomize_with(&mut rand::rng());
    }

    pub fn randomize_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.grid.randomize(rng);
        self.generation = 0;
        self.notify();
    }

    /// Clears the grid and stamps `pattern` with its top-left corner at
    /// `origin`. Fails without touching the grid if the pattern does not fit.
    pub fn apply_pattern(&mut self, pattern: &Pattern, origin: (usize, usize)) -> Result<()> {
        let mut next = self.grid.clone();
        next.clear();
        next.stamp(pattern, origin)?;
        debug!("applied {} at {:?}", pattern.name, origin);
        self.grid = next;
        self.generation = 0;
        self.notify();
        Ok(())
    }
}

impl fmt::Debug for GridSimulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridSimulation")
            .field("width", &self.grid.width())
            .field("height", &self.grid.height())
            .field("generation", &self.generation)
            .field("tick_interval", &self.tick_interval)
            .field("run_state", &self.run_state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::patterns;

    const INTERVAL: Duration = Duration::from_millis(100);

    fn simulation(rows: &[&str]) -> GridSimulation {
        let grid = Grid::from_rows(rows).unwrap();
        GridSimulation::new(grid.width(), grid.height(), grid, 100).unwrap()
    }

    fn empty(width: usize, height: usize) -> GridSimulation {
        GridSimulation::new(width, height, Grid::new(width, height).unwrap(), 100).unwrap()
    }

    fn count_renders(sim: &mut GridSimulation) -> Rc<RefCell<usize>> {
        let renders = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&renders);
        sim.set_render_hook(move |_| *counter.borrow_mut() += 1);
        renders
    }

    #[test]
    fn mismatched_initial_grid_is_rejected() {
        let grid = Grid::new(4, 3).unwrap();
        assert!(matches!(
            GridSimulation::new(3, 4, grid, 30),
            Err(LifeError::InvalidDimensions { width: 4, height: 3, .. })
        ));
        let message = GridSimulation::new(3, 4, Grid::new(4, 3).unwrap(), 30)
            .unwrap_err()
            .to_string();
        assert!(message.contains("4x3"), "{message}");
        assert!(message.contains("requested 3x4"), "{message}");
    }

    #[test]
    fn zero_interval_is_rejected() {
        let grid = Grid::new(3, 3).unwrap();
        assert_eq!(
            GridSimulation::new(3, 3, grid, 0).unwrap_err(),
            LifeError::InvalidInterval(0)
        );
    }

    #[test]
    fn from_config_builds_dead_grid() {
        let sim = GridSimulation::from_config(&SimulationConfig::default()).unwrap();
        assert_eq!((sim.grid().width(), sim.grid().height()), (40, 40));
        assert_eq!(sim.grid().alive_count(), 0);
        assert_eq!(sim.tick_interval(), Duration::from_millis(30));
        assert!(!sim.is_running());
    }

    #[test]
    fn lone_cell_dies() {
        let mut sim = simulation(&["...", ".#.", "..."]);
        assert!(sim.step());
        assert_eq!(sim.grid().alive_count(), 0);
        assert_eq!(sim.generation(), 1);
    }

    #[test]
    fn block_is_still_life() {
        let mut sim = simulation(&["....", ".##.", ".##.", "...."]);
        let before = sim.grid().clone();
        for _ in 0..10 {
            assert!(!sim.step());
            assert_eq!(sim.grid(), &before);
        }
    }

    #[test]
    fn blinker_has_period_two() {
        let mut sim = simulation(&[".....", ".....", ".###.", ".....", "....."]);
        let before = sim.grid().clone();
        sim.step();
        assert_eq!(sim.grid().to_string(), ".....\n..#..\n..#..\n..#..\n.....\n");
        sim.step();
        assert_eq!(sim.grid(), &before);
    }

    #[test]
    fn neighbor_queries_delegate_to_grid() {
        let sim = simulation(&["##.", "#..", "..."]);
        assert_eq!(sim.alive_neighbor_count(1, 1).unwrap(), 3);
        assert_eq!(sim.alive_neighbor_count(0, 0).unwrap(), 2);
        assert_eq!(sim.neighbors_of(2, 2).unwrap().len(), 3);
    }

    #[test]
    fn toggle_twice_restores() {
        let mut sim = empty(4, 4);
        let renders = count_renders(&mut sim);
        assert_eq!(sim.toggle_cell(1, 2).unwrap(), CellState::Alive);
        assert_eq!(sim.grid().alive_count(), 1);
        assert!(sim.grid().is_alive(1, 2).unwrap());
        assert_eq!(sim.toggle_cell(1, 2).unwrap(), CellState::Dead);
        assert_eq!(sim.grid().alive_count(), 0);
        assert_eq!(*renders.borrow(), 2);
        assert_eq!(sim.generation(), 0);
    }

    #[test]
    fn out_of_bounds_never_mutates_or_renders() {
        let mut sim = simulation(&["#..", "...", "..#"]);
        let renders = count_renders(&mut sim);
        let before = sim.grid().clone();
        assert!(matches!(sim.toggle_cell(3, 0), Err(LifeError::OutOfBounds { .. })));
        assert!(matches!(sim.toggle_cell(0, 3), Err(LifeError::OutOfBounds { .. })));
        assert!(matches!(sim.neighbors_of(5, 5), Err(LifeError::OutOfBounds { .. })));
        assert!(matches!(sim.alive_neighbor_count(0, 9), Err(LifeError::OutOfBounds { .. })));
        assert_eq!(sim.grid(), &before);
        assert_eq!(*renders.borrow(), 0);
    }

    #[test]
    fn render_hook_sees_the_new_generation() {
        let mut sim = simulation(&[".....", ".....", ".###.", ".....", "....."]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        sim.set_render_hook(move |grid| sink.borrow_mut().push(grid.to_string()));

        sim.step();
        assert_eq!(seen.borrow().as_slice(), &[sim.grid().to_string()]);

        sim.clear_render_hook();
        sim.step();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn stopped_simulation_ignores_time() {
        let mut sim = empty(3, 3);
        assert_eq!(sim.advance(INTERVAL * 50), 0);
        assert_eq!(sim.generation(), 0);
    }

    #[test]
    fn ticks_fire_once_per_interval() {
        let mut sim = empty(3, 3);
        sim.start();
        assert_eq!(sim.advance(Duration::from_millis(99)), 0);
        assert_eq!(sim.advance(Duration::from_millis(1)), 1);
        assert_eq!(sim.advance(INTERVAL * 3), 3);
        assert_eq!(sim.generation(), 4);
    }

    #[test]
    fn long_stall_is_capped_not_replayed() {
        let mut sim = GridSimulation::from_config(&SimulationConfig::default()).unwrap();
        sim.randomize();
        sim.start();
        assert_eq!(sim.advance(Duration::from_secs(600)), MAX_TICKS_PER_ADVANCE);
        assert_eq!(sim.generation(), u64::from(MAX_TICKS_PER_ADVANCE));

        // The missed intervals are gone; normal pacing resumes.
        assert_eq!(sim.advance(Duration::from_millis(30)), 1);
        assert_eq!(sim.advance(Duration::from_millis(29)), 0);
    }

    #[test]
    fn huge_elapsed_time_saturates() {
        let mut sim = empty(3, 3);
        sim.start();
        sim.advance(Duration::from_millis(50));
        assert_eq!(sim.advance(Duration::MAX), MAX_TICKS_PER_ADVANCE);
        assert_eq!(sim.advance(Duration::MAX), MAX_TICKS_PER_ADVANCE);
        assert!(sim.is_running());
    }

    #[test]
    fn due_ticks_up_to_the_ceiling_all_fire() {
        let mut sim = empty(3, 3);
        sim.start();
        let ceiling = MAX_TICKS_PER_ADVANCE;
        assert_eq!(sim.advance(INTERVAL * ceiling + Duration::from_millis(40)), ceiling);
        // The partial interval carries over.
        assert_eq!(sim.advance(Duration::from_millis(60)), 1);
    }

    #[test]
    fn double_start_runs_one_timer() {
        let mut sim = empty(3, 3);
        let renders = count_renders(&mut sim);
        sim.start();
        sim.advance(Duration::from_millis(50));
        sim.start();
        assert!(sim.is_running());

        let fired: u32 = (0..20).map(|_| sim.advance(Duration::from_millis(25))).sum();
        // 50 ms carried over plus 500 ms: five full intervals, not ten.
        assert_eq!(fired, 5);
        assert_eq!(sim.generation(), 5);
        assert_eq!(*renders.borrow(), 5);
    }

    #[test]
    fn stop_cancels_pending_ticks() {
        let mut sim = empty(3, 3);
        sim.start();
        sim.advance(Duration::from_millis(90));
        sim.stop();
        sim.stop();
        assert!(!sim.is_running());
        assert_eq!(sim.advance(INTERVAL * 100), 0);
        assert_eq!(sim.generation(), 0);

        // A restart begins a fresh interval; the 90 ms from before is gone.
        sim.start();
        assert_eq!(sim.advance(Duration::from_millis(10)), 0);
        assert_eq!(sim.advance(Duration::from_millis(90)), 1);
    }

    #[test]
    fn interval_change_while_running_restarts_timer() {
        let mut sim = empty(3, 3);
        sim.start();
        assert_eq!(sim.advance(Duration::from_millis(250)), 2);

        sim.set_tick_interval(40).unwrap();
        assert_eq!(sim.generation(), 2);
        assert!(sim.is_running());
        assert_eq!(sim.advance(Duration::from_millis(39)), 0);
        assert_eq!(sim.advance(Duration::from_millis(1)), 1);
        assert_eq!(sim.advance(Duration::from_millis(120)), 3);
        assert_eq!(sim.generation(), 6);
    }

    #[test]
    fn interval_change_while_stopped_keeps_it_stopped() {
        let mut sim = empty(3, 3);
        sim.set_tick_interval(10).unwrap();
        assert!(!sim.is_running());
        assert_eq!(sim.tick_interval(), Duration::from_millis(10));
        sim.start();
        assert_eq!(sim.advance(Duration::from_millis(30)), 3);
    }

    #[test]
    fn invalid_interval_keeps_old_period() {
        let mut sim = empty(3, 3);
        sim.start();
        sim.advance(Duration::from_millis(60));
        assert_eq!(sim.set_tick_interval(0), Err(LifeError::InvalidInterval(0)));
        assert_eq!(sim.tick_interval(), INTERVAL);
        assert_eq!(sim.advance(Duration::from_millis(40)), 1);
    }

    #[test]
    fn toggle_running_flips_state() {
        let mut sim = empty(3, 3);
        assert!(sim.toggle_running());
        assert!(sim.is_running());
        assert!(!sim.toggle_running());
        assert!(!sim.is_running());
    }

    #[test]
    fn step_and_toggle_keep_run_state() {
        let mut sim = empty(3, 3);
        sim.step();
        sim.toggle_cell(0, 0).unwrap();
        assert!(!sim.is_running());
        sim.start();
        sim.step();
        sim.toggle_cell(0, 0).unwrap();
        assert!(sim.is_running());
    }

    #[test]
    fn apply_pattern_replaces_grid_and_resets_generation() {
        let mut sim = simulation(&["#....", ".....", ".....", ".....", "....#"]);
        sim.step();
        let renders = count_renders(&mut sim);

        let blinker = patterns::find("blinker").unwrap();
        sim.apply_pattern(blinker, (1, 2)).unwrap();
        assert_eq!(sim.grid().to_string(), ".....\n.....\n.###.\n.....\n.....\n");
        assert_eq!(sim.generation(), 0);
        assert_eq!(*renders.borrow(), 1);

        let before = sim.grid().clone();
        assert!(matches!(
            sim.apply_pattern(blinker, (3, 0)),
            Err(LifeError::OutOfBounds { .. })
        ));
        assert_eq!(sim.grid(), &before);
        assert_eq!(*renders.borrow(), 1);
    }

    #[test]
    fn clear_kills_everything() {
        let mut sim = simulation(&["##", "##"]);
        sim.step();
        sim.clear();
        assert_eq!(sim.grid().alive_count(), 0);
        assert_eq!(sim.generation(), 0);
    }
}
