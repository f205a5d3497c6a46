/// Identifier for an object in a [`crate::store::ParticleStore`].
///
/// This is an index into the store's arena, and is only meaningful until
/// the next `pop_back` or `erase` on that store shifts the sequence.
pub type ParticleId = usize;

/// 4-channel 8-bit colour used by the render contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}
