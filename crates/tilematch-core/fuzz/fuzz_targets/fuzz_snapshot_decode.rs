#![no_main]
use libfuzzer_sys::fuzz_target;
use tilematch_core::game::Game;
use tilematch_core::snapshot::SnapshotRecord;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes through both decoders and, if they decode, through
    // load. Must not panic -- returning Err is fine.
    let mut game = Game::default();
    if let Ok(record) = SnapshotRecord::from_bytes(data) {
        let _ = game.load(&record);
    }
    if let Ok(text) = std::str::from_utf8(data)
        && let Ok(record) = SnapshotRecord::from_json(text)
    {
        let _ = game.load(&record);
    }
});
