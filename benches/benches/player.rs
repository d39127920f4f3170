use std::path::Path;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sunbox_engine::{
    EngineError, EngineModule, EngineSession, EngineSettings, InitFlags, SongPlayer,
};

/// Engine stand-in producing a cheap saw so the benchmark measures the
/// session and de-interleave path rather than synthesis.
struct SawEngine {
    length: u32,
    position: u32,
}

impl EngineModule for SawEngine {
    fn init(&mut self, _: u32, _: u32, _: InitFlags) -> Result<(), EngineError> {
        Ok(())
    }
    fn deinit(&mut self) {}
    fn open_slot(&mut self, _: i32) -> Result<(), EngineError> {
        Ok(())
    }
    fn close_slot(&mut self, _: i32) {}
    fn set_volume(&mut self, _: i32, _: i32) {}
    fn load_song(&mut self, _: i32, _: &Path) -> Result<(), EngineError> {
        Ok(())
    }
    fn play_from_beginning(&mut self, _: i32) {
        self.position = 0;
    }
    fn stop(&mut self, _: i32) {}
    fn set_autostop(&mut self, _: i32, _: bool) {}
    fn song_length_frames(&mut self, _: i32) -> u32 {
        self.length
    }
    fn ticks(&mut self) -> u32 {
        0
    }
    fn render(&mut self, out: &mut [f32], _: u32) {
        for frame in out.chunks_exact_mut(2) {
            let sample = self.position as f32 / self.length as f32;
            frame[0] = sample;
            frame[1] = -sample;
            self.position = (self.position + 1) % self.length;
        }
    }
}

fn player_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("player");
    group.measurement_time(Duration::from_secs(5));

    for block in [64usize, 256, 1024] {
        group.bench_with_input(BenchmarkId::new("run", block), &block, |b, &block| {
            let session = EngineSession::open(
                || {
                    Ok(SawEngine {
                        // short enough that most iterations cross the loop point
                        length: 3 * block as u32 / 2,
                        position: 0,
                    })
                },
                EngineSettings::new(48_000),
            );
            let mut player = SongPlayer::new(session);
            player
                .load_song(Path::new("bench.sunvox"))
                .expect("load song");
            player.activate(block);
            let mut left = vec![0.0; block];
            let mut right = vec![0.0; block];

            b.iter(|| player.run(&mut left, &mut right));
        });
    }

    group.finish();
}

criterion_group!(benches, player_run);
criterion_main!(benches);
