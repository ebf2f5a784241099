//! Property tests for procedural generation structure.

use gloam::{
    bfs_path, DungeonGenerator, GameData, GenerationConfig, Generator, PotionIdentityMap, Tile,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

proptest! {
    #[test]
    fn generated_levels_validate(seed in 0u64..500, depth in 1u32..=10) {
        let config = GenerationConfig::default();
        let data = GameData::standard();
        let mut rng = StdRng::seed_from_u64(seed);
        let generator = DungeonGenerator::new();

        let level = generator
            .generate(&config, &data, depth, &mut rng)
            .expect("generation should succeed");
        generator
            .validate(&level, &config)
            .expect("generated level should validate");

        prop_assert!(!level.rooms.is_empty());
        // The cap covers sampled rooms; a bonus secret room may ride along.
        let sampled = level.rooms.iter().filter(|r| !r.secret).count();
        prop_assert!(sampled <= 12);
        let has_portal = (0..level.height as i32).any(|y| {
            (0..level.width as i32)
                .any(|x| level.tile(gloam::Position::new(x, y)) == Some(Tile::Portal))
        });
        prop_assert!(has_portal);
    }

    #[test]
    fn room_centers_are_mutually_reachable(seed in 0u64..200) {
        let config = GenerationConfig::for_testing();
        let data = GameData::standard();
        let mut rng = StdRng::seed_from_u64(seed);
        let level = DungeonGenerator::new()
            .generate(&config, &data, 1, &mut rng)
            .expect("generation should succeed");

        let start = level.rooms[0].center();
        for room in level.rooms.iter().skip(1).filter(|r| !r.secret) {
            let path = bfs_path(&level, start, room.center());
            let path = path.expect("non-secret rooms should be reachable");
            let mut prev = start;
            for &step in &path {
                prop_assert!(prev.chebyshev_distance(step) <= 1);
                prop_assert!(level.is_walkable(step));
                prev = step;
            }
            prop_assert_eq!(prev, room.center());
        }
    }

    #[test]
    fn potion_cosmetics_are_a_bijection(seed in 0u64..500) {
        let mut rng = StdRng::seed_from_u64(seed);
        let map = PotionIdentityMap::generate(&mut rng);

        let mut seen = HashSet::new();
        for kind in gloam::data::PotionKind::all() {
            let (appearance, color) = map.cosmetic(kind);
            prop_assert!(seen.insert((appearance.to_string(), color.to_string())));
            prop_assert!(!map.is_identified(kind));
        }
    }
}
