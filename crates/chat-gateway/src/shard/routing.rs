//! Guild to shard assignment

use chat_core::Snowflake;

/// Shard responsible for `guild_id`
///
/// Uses the snowflake's timestamp bits, so the result depends only on the id
/// and the shard count. A zero shard count routes everything to shard 0.
#[must_use]
pub fn shard_for(guild_id: Snowflake, shard_count: u32) -> u32 {
    if shard_count == 0 {
        return 0;
    }
    (guild_id.timestamp_bits() % u64::from(shard_count)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_shard_takes_everything() {
        for id in [0_u64, 1, 41_771_983_423_143_936, u64::MAX] {
            assert_eq!(shard_for(Snowflake::new(id), 1), 0);
        }
    }

    #[test]
    fn test_uses_timestamp_bits() {
        // (id >> 22) = 3
        let id = Snowflake::new(3 << 22 | 0x3F_FFFF);
        assert_eq!(shard_for(id, 2), 1);
        assert_eq!(shard_for(id, 3), 0);
        assert_eq!(shard_for(id, 4), 3);
    }

    #[test]
    fn test_stable_and_in_range() {
        for raw in (0..500_u64).map(|n| n.wrapping_mul(0x9E37_79B9_7F4A_7C15)) {
            let id = Snowflake::new(raw);
            let first = shard_for(id, 16);
            assert!(first < 16);
            assert_eq!(shard_for(id, 16), first);
        }
    }

    #[test]
    fn test_zero_shards() {
        assert_eq!(shard_for(Snowflake::new(123 << 22), 0), 0);
    }
}
