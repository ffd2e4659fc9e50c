// On-disk record sizes, packed little-endian (no padding).
pub const MBR_SIZE: usize = 204; // 8 + 19 + 4 + 1 + 4 * PART_ENTRY_SIZE
pub const PART_ENTRY_SIZE: usize = 43; // 1 + 1 + 1 + 8 + 8 + 16 + 4 + 4
pub const EBR_SIZE: usize = 42; // 1 + 1 + 8 + 8 + 8 + 16

pub const PART_NAME_LEN: usize = 16;
pub const TIMESTAMP_LEN: usize = 19; // "YYYY-MM-DD HH:MM:SS"

// Partition entry status byte.
pub const STATUS_FREE: u8 = 0;
pub const STATUS_ACTIVE: u8 = b'0';
pub const STATUS_MOUNTED: u8 = b'1';

// Canonical EBR chain terminator. A zero `next` is a legacy encoding of
// the same thing and is accepted on read.
pub const EBR_END: i64 = -1;

// Traversal bound so a corrupted cycle cannot hang a chain walk.
pub const MAX_EBR_HOPS: usize = 1024;

// Fixed prefix of every mount identifier.
pub const HOST_TAG: &str = "03";

pub const UNIT_B: i64 = 1;
pub const UNIT_K: i64 = 1024;
pub const UNIT_M: i64 = 1024 * 1024;
