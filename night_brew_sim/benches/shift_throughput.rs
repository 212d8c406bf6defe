// Benchmarks a full auto-played night shift.
//
// Measures construction plus the whole tick loop (customer activations,
// phone steps, register traffic) for the default scripted roster and for a
// larger random roster.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use night_brew_sim::autoplay::Autoplayer;
use night_brew_sim::config::GameConfig;
use night_brew_sim::phone::PhoneChoice;
use night_brew_sim::roster::RosterConfig;
use night_brew_sim::sim::ShopState;

const MAX_TICKS: u64 = 10_000_000;

fn bench_default_shift(c: &mut Criterion) {
    let bot = Autoplayer::new(PhoneChoice::Accept);
    c.bench_function("default_shift", |b| {
        b.iter(|| {
            let mut shop = ShopState::new(black_box(42));
            bot.run(&mut shop, MAX_TICKS)
        })
    });
}

fn bench_random_shift(c: &mut Criterion) {
    let bot = Autoplayer::new(PhoneChoice::Accept);
    let mut config = GameConfig::default();
    config.roster = RosterConfig::Random {
        count: 200,
        max_quantity: 3,
        sit_chance: 0.25,
    };
    c.bench_function("random_shift_200", |b| {
        b.iter(|| {
            let mut shop = ShopState::with_config(black_box(7), config.clone());
            bot.run(&mut shop, MAX_TICKS)
        })
    });
}

criterion_group!(benches, bench_default_shift, bench_random_shift);
criterion_main!(benches);
