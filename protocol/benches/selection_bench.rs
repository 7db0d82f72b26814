// Block selection benchmarks: building the price/nonce heap and draining it
// into a block for growing numbers of accounts.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use aurora_protocol::primitives::Address;
use aurora_protocol::transaction::{Action, Transaction, TransactionBuilder};
use aurora_protocol::txpool::{fill_block, TransactionsByPriceAndNonce};

const TXS_PER_ACCOUNT: u64 = 16;

fn groups(accounts: usize) -> Vec<(Address, Vec<Transaction>)> {
    (0..accounts)
        .map(|i| {
            let mut raw = [0u8; 20];
            raw[..8].copy_from_slice(&(i as u64).to_be_bytes());
            let txs = (0..TXS_PER_ACCOUNT)
                .map(|nonce| {
                    TransactionBuilder::new(Action::Transfer)
                        .nonce(nonce)
                        .gas(21_000)
                        .gas_price((i as u64 * 31 + nonce * 17) % 97 + 1)
                        .build()
                })
                .collect();
            (Address::new(raw), txs)
        })
        .collect()
}

fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection/drain");

    for accounts in [10usize, 100, 1_000] {
        let input = groups(accounts);
        group.throughput(Throughput::Elements(accounts as u64 * TXS_PER_ACCOUNT));
        group.bench_with_input(BenchmarkId::from_parameter(accounts), &input, |b, input| {
            b.iter_batched(
                || input.clone(),
                |input| {
                    let mut queue = TransactionsByPriceAndNonce::new(input);
                    while queue.peek().is_some() {
                        queue.shift();
                    }
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_fill_block(c: &mut Criterion) {
    let input = groups(500);
    c.bench_function("selection/fill_block_8m_gas", |b| {
        b.iter_batched(
            || TransactionsByPriceAndNonce::new(input.clone()),
            |mut queue| fill_block(&mut queue, 8_000_000, |_| Ok::<(), String>(())),
            criterion::BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_drain, bench_fill_block);
criterion_main!(benches);
