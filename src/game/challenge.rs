//! Challenge drawing
//!
//! Draws are uniform over the eight target buttons and independent of each
//! other, so the same button can come up twice in a row.

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::controller::Buttons;

/// Button the player has to press next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Challenge {
    LeftShoulder,
    RightShoulder,
    A,
    B,
    X,
    Y,
    LeftTrigger,
    RightTrigger,
}

impl Challenge {
    /// Fixed draw set, index order matters for seeded reproducibility
    pub const ALL: [Challenge; 8] = [
        Challenge::LeftShoulder,
        Challenge::RightShoulder,
        Challenge::A,
        Challenge::B,
        Challenge::X,
        Challenge::Y,
        Challenge::LeftTrigger,
        Challenge::RightTrigger,
    ];

    pub fn mask(self) -> Buttons {
        match self {
            Challenge::LeftShoulder => Buttons::LEFT_SHOULDER,
            Challenge::RightShoulder => Buttons::RIGHT_SHOULDER,
            Challenge::A => Buttons::A,
            Challenge::B => Buttons::B,
            Challenge::X => Buttons::X,
            Challenge::Y => Buttons::Y,
            Challenge::LeftTrigger => Buttons::LEFT_TRIGGER,
            Challenge::RightTrigger => Buttons::RIGHT_TRIGGER,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Challenge::LeftShoulder => "LS",
            Challenge::RightShoulder => "RS",
            Challenge::A => "A",
            Challenge::B => "B",
            Challenge::X => "X",
            Challenge::Y => "Y",
            Challenge::LeftTrigger => "LT",
            Challenge::RightTrigger => "RT",
        }
    }

    /// First challenge found in `buttons`, checked in draw-set order
    pub fn from_mask(buttons: Buttons) -> Option<Challenge> {
        Self::ALL
            .into_iter()
            .find(|challenge| buttons.contains(challenge.mask()))
    }
}

/// Draws one challenge from `rng`
pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Challenge {
    let index = Uniform::new(0, Challenge::ALL.len()).sample(rng);
    Challenge::ALL[index]
}

/// Seedable source of challenges
#[derive(Debug)]
pub struct ChallengeGenerator {
    rng: StdRng,
}

impl ChallengeGenerator {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next(&mut self) -> Challenge {
        draw(&mut self.rng)
    }
}
