use super::*;

impl GameSession {
    pub(super) fn reset_game(&mut self) {
        self.elapsed_ms = 0;
        self.last_regen_ms = 0;
        self.notice_started_ms = None;
        self.regenerations = 0;
        self.tick_counter = 0;
        self.outcome = None;
        self.paused = false;
        self.input = InputState::default();
        self.events.clear();

        generate_maze(&mut self.grid, &mut self.rng);
        self.reset_entities(true);
        self.state = SessionState::Playing;
        self.events.push(RuntimeEvent::SessionStarted);
    }

    pub(super) fn regenerate_world(&mut self, now_ms: u64) {
        generate_maze(&mut self.grid, &mut self.rng);
        self.reset_entities(false);
        self.last_regen_ms = now_ms;
        self.notice_started_ms = Some(now_ms);
        self.regenerations = self.regenerations.saturating_add(1);
        self.events
            .push(RuntimeEvent::MazeRegenerated { at_ms: now_ms });
    }

    pub(super) fn reset_entities(&mut self, reset_player: bool) {
        if reset_player {
            self.player = Player::spawn(&self.config);
        }
        self.entities = place_entities(&self.config, &mut self.rng);
    }
}
