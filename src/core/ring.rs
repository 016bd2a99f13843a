use std::mem::size_of;

pub type Digest = u64;
// number of bits
pub const NUM_BITS: usize = size_of::<Digest>() * 8;

// Strictly in range: id in (start, end)
pub fn in_range(id: Digest, start: Digest, end: Digest) -> bool {
	if end > start {
		// (start, id, end)
		id > start && id < end
	}
	else {
		// end <= start
		// case 1: (start, id, end + MAX_VAL)
		// case 2: (start, id + MAX_VAL, end + MAX_VAL)
		id > start || id < end
	}
}

/// Check whether id lies in (start, end] walking clockwise.
///
/// An unknown start is read as the position right after `end`,
/// so the interval covers the whole ring.
/// The same holds when start == end.
pub fn between_right_inclusive(id: Digest, start: Option<Digest>, end: Digest) -> bool {
	match start {
		Some(s) => in_range(id, s, end) || id == end,
		None => true
	}
}

pub fn ids_equal(a: Digest, b: Digest) -> bool {
	a == b
}
