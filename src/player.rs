use crate::config::SessionConfig;
use crate::grid::cell_center;
use crate::types::{InputState, PlayerView, Point};

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub base_speed: f32,
    pub speed_multiplier: f32,
    pub speed_until: u64,
    pub illuminated_until: u64,
    pub jump_charges: u32,
}

impl Player {
    pub fn spawn(config: &SessionConfig) -> Self {
        let (x, y) = cell_center(0, 0, config.cell_size);
        Self {
            x,
            y,
            base_speed: config.player_speed,
            speed_multiplier: 1.0,
            speed_until: 0,
            illuminated_until: 0,
            jump_charges: 0,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn active_speed_multiplier(&self, now_ms: u64) -> f32 {
        if now_ms < self.speed_until {
            self.speed_multiplier
        } else {
            1.0
        }
    }

    pub fn is_illuminated(&self, now_ms: u64) -> bool {
        now_ms < self.illuminated_until
    }

    pub fn grant_speed(&mut self, multiplier: f32, until_ms: u64) {
        self.speed_multiplier = multiplier;
        self.speed_until = until_ms;
    }

    pub fn grant_illumination(&mut self, until_ms: u64) {
        self.illuminated_until = until_ms;
    }

    pub fn grant_jumps(&mut self, charges: u32) {
        self.jump_charges = self.jump_charges.saturating_add(charges);
    }

    pub fn velocity(&self, input: &InputState, now_ms: u64) -> (f32, f32) {
        let speed = self.base_speed * self.active_speed_multiplier(now_ms);
        let mut vx = 0.0;
        let mut vy = 0.0;
        if input.left {
            vx = -speed;
        }
        if input.right {
            vx = speed;
        }
        if input.up {
            vy = -speed;
        }
        if input.down {
            vy = speed;
        }
        (vx, vy)
    }

    pub fn view(&self, now_ms: u64) -> PlayerView {
        PlayerView {
            x: self.x,
            y: self.y,
            speed_multiplier: self.active_speed_multiplier(now_ms),
            speed_until: self.speed_until,
            illuminated_until: self.illuminated_until,
            illuminated: self.is_illuminated(now_ms),
            jump_charges: self.jump_charges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    #[test]
    fn spawns_at_first_cell_center() {
        let player = Player::spawn(&SessionConfig::default());
        assert_eq!((player.x, player.y), (15.0, 15.0));
        assert_eq!(player.jump_charges, 0);
        assert!(!player.is_illuminated(0));
    }

    #[test]
    fn speed_buff_expires_at_its_timestamp() {
        let mut player = Player::spawn(&SessionConfig::default());
        let t = 12_000;
        player.grant_speed(2.0, t + 5_000);

        assert_eq!(player.active_speed_multiplier(t + 4_999), 2.0);
        assert_eq!(player.active_speed_multiplier(t + 5_000), 1.0);
        assert_eq!(player.active_speed_multiplier(t + 5_001), 1.0);

        let input = InputState::only(Direction::Right);
        assert_eq!(player.velocity(&input, t + 4_999), (240.0, 0.0));
        assert_eq!(player.velocity(&input, t + 5_001), (120.0, 0.0));
    }

    #[test]
    fn later_key_wins_when_opposites_are_held() {
        let player = Player::spawn(&SessionConfig::default());
        let input = InputState {
            up: true,
            down: true,
            left: true,
            right: true,
        };
        assert_eq!(player.velocity(&input, 0), (120.0, 120.0));
        assert_eq!(player.velocity(&InputState::default(), 0), (0.0, 0.0));
    }

    #[test]
    fn illumination_is_a_timestamp_comparison() {
        let mut player = Player::spawn(&SessionConfig::default());
        player.grant_illumination(10_000);
        assert!(player.is_illuminated(9_999));
        assert!(!player.is_illuminated(10_000));
        assert!(player.view(500).illuminated);
    }
}
