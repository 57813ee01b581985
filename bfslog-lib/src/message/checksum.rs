/// Running two byte checksum used by message frames.
///
/// Two 8-bit accumulators are updated for every byte: the first sums the bytes and
/// the second sums the running value of the first, both modulo 256. The checksum is
/// `[acc0, acc1]`, written to the frame in that order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Checksum {
    acc0: u8,
    acc1: u8,
}

impl Checksum {
    /// Size of the checksum trailer
    pub const LEN: usize = 2;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, dat: &[u8]) {
        for b in dat {
            self.acc0 = self.acc0.wrapping_add(*b);
            self.acc1 = self.acc1.wrapping_add(self.acc0);
        }
    }

    #[must_use]
    pub fn value(&self) -> [u8; Self::LEN] {
        [self.acc0, self.acc1]
    }
}

/// Compute the frame checksum over `dat`.
#[must_use]
pub fn checksum(dat: &[u8]) -> [u8; Checksum::LEN] {
    let mut ck = Checksum::new();
    ck.update(dat);
    ck.value()
}
