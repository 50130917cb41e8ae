/// Which way the player car is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Facing {
    #[default]
    Front,
    Left,
    Right,
}

/// Drive keys held during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriveInput {
    pub throttle: bool,
    pub brake: bool,
    pub left: bool,
    pub right: bool,
    /// Extra engine force and advance
    pub boost: bool,
    /// Fast advance without engaging the engine model
    pub cruise: bool,
}

impl DriveInput {
    pub fn is_idle(&self) -> bool {
        *self == DriveInput::default()
    }

    /// Translate held keys into this tick's movement.
    ///
    /// Right wins over left; cruise only applies when not steering. The
    /// engine model runs only while throttle, brake or a steering key is held.
    pub fn command(&self, segment_length: f64, speed_multiplier: f64, throttle_boost: f64) -> DriveCommand {
        let mut command = DriveCommand::default();

        if self.throttle {
            command.moving = true;
            command.boost += throttle_boost;
            command.advance += segment_length * speed_multiplier;
            command.tire_wear += 0.01;
        }

        if self.brake {
            command.moving = true;
            command.braking = true;
            command.advance -= segment_length;
            command.tire_wear += 0.01;
        }

        if self.right {
            command.moving = true;
            command.steer = 1.0;
            command.advance += segment_length;
            command.facing = Facing::Right;
        } else if self.left {
            command.moving = true;
            command.steer = -1.0;
            command.advance += segment_length;
            command.facing = Facing::Left;
        } else if self.cruise {
            command.advance += segment_length * 3.0;
        }

        if self.boost {
            command.moving = true;
            command.boost += throttle_boost;
            command.advance += segment_length;
            command.tire_wear += 0.1;
        }

        if !(self.throttle || self.brake || self.left || self.right) {
            command.moving = false;
        }

        command
    }
}

/// Movement derived from [`DriveInput`] for a single tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DriveCommand {
    /// Whether the engine model runs this tick
    pub moving: bool,
    pub braking: bool,
    /// Extra engine force
    pub boost: f64,
    /// Signed distance moved along the track
    pub advance: f64,
    /// -1 left, 0 straight, 1 right
    pub steer: f64,
    pub tire_wear: f64,
    pub facing: Facing,
}
