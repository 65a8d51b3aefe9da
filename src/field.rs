/// A bit field inside a 32-bit register, described by its lowest bit and width.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    pub lsb: u8,
    pub width: u8,
}

impl Field {
    /// Field covering the inclusive bit range `lower..=upper`.
    pub const fn bits(lower: u8, upper: u8) -> Self {
        assert!(upper >= lower);
        assert!(upper < 32);

        Field {
            lsb: lower,
            width: upper - lower + 1,
        }
    }

    /// Single-bit field.
    pub const fn bit(index: u8) -> Self {
        Field::bits(index, index)
    }

    pub const fn upper(&self) -> u8 {
        self.lsb + self.width - 1
    }

    /// Mask of the field in register position.
    pub const fn mask(&self) -> u32 {
        let unshifted = if self.width >= 32 {
            u32::MAX
        } else {
            (1u32 << self.width) - 1
        };
        unshifted << self.lsb
    }

    /// Largest value the field can hold.
    pub const fn max(&self) -> u32 {
        self.mask() >> self.lsb
    }

    /// Place `value` into the field; bits past the width are dropped.
    pub const fn encode(&self, value: u32) -> u32 {
        (value << self.lsb) & self.mask()
    }

    pub const fn decode(&self, raw: u32) -> u32 {
        (raw & self.mask()) >> self.lsb
    }

    pub const fn fits(&self, value: u32) -> bool {
        value <= self.max()
    }

    pub const fn overlaps(&self, other: &Field) -> bool {
        self.mask() & other.mask() != 0
    }
}

/// OR together independently encoded fields.
pub fn pack(fields: &[(Field, u32)]) -> u32 {
    fields
        .iter()
        .fold(0, |acc, (field, value)| acc | field.encode(*value))
}

/// True if any two of the given fields share a bit.
pub fn any_overlap(fields: &[Field]) -> bool {
    fields
        .iter()
        .enumerate()
        .any(|(i, a)| fields[i + 1..].iter().any(|b| a.overlaps(b)))
}
