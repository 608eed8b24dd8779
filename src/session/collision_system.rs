use super::*;

impl GameSession {
    pub(super) fn check_enemy_collision(&mut self) {
        let reach = self.config.cell_size * self.config.enemy_hit_ratio;
        let player = self.player.position();
        let caught_by = self
            .entities
            .enemies
            .iter()
            .find(|enemy| enemy.position().distance(player) < reach)
            .map(|enemy| enemy.id);
        if let Some(enemy_id) = caught_by {
            self.events.push(RuntimeEvent::PlayerCaught { enemy_id });
            self.finish(GameOutcome::Caught);
        }
    }

    pub(super) fn check_trap_collision(&mut self) {
        let player = self.player.position();
        let cell_size = self.config.cell_size;
        for trap in &mut self.entities.traps {
            if !trap.active || !trap.contains(player, cell_size) {
                continue;
            }
            trap.trigger(&mut self.grid);
            self.events.push(RuntimeEvent::TrapTriggered {
                i: trap.i,
                j: trap.j,
            });
        }
    }

    pub(super) fn check_power_up_collision(&mut self, now_ms: u64) {
        let player_pos = self.player.position();
        let reach = self.config.cell_size * self.config.power_up_pickup_ratio;
        for power_up in &mut self.entities.power_ups {
            if !power_up.active || power_up.center(self.config.cell_size).distance(player_pos) >= reach
            {
                continue;
            }
            let until_ms = power_up.apply(&mut self.player, now_ms, &self.config);
            self.events.push(RuntimeEvent::PowerUpTaken {
                kind: power_up.kind,
                until_ms,
            });
        }
    }

    pub(super) fn check_exit(&mut self) {
        if self.player_cell() == self.config.exit_cell() {
            self.events.push(RuntimeEvent::PlayerEscaped);
            self.finish(GameOutcome::Escaped);
        }
    }

    fn finish(&mut self, outcome: GameOutcome) {
        if self.is_ended() {
            return;
        }
        self.outcome = Some(outcome);
        self.state = match outcome {
            GameOutcome::Escaped => SessionState::Won,
            GameOutcome::Caught => SessionState::Lost,
        };
    }
}
