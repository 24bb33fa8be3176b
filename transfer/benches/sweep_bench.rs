// Assembly and signing benchmarks for legacy sweeps.
//
// Covers the fee fixpoint on its own and the full assemble + sign + package
// path at various input counts.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use legacy_transfer::crypto::ExtendedSigningKey;
use legacy_transfer::transaction::assemble_sweep;
use legacy_transfer::wallet::TxHash;
use legacy_transfer::{build_sweep, Address, Addressing, Bip32SigningKey, Network, ProtocolParams, Utxo};

const DESTINATION: &str = "Ae2tdPwUPEZ-bench-destination";

fn utxos(count: u32) -> Vec<Utxo> {
    (0..count)
        .map(|i| Utxo {
            tx_hash: TxHash::new([(i % 251) as u8; 32]),
            output_index: i,
            amount: 2_000_000 + u64::from(i),
            owner: Address::owned(format!("addr-{i}"), Addressing::bip44(0, 0, i)),
        })
        .collect()
}

fn bench_assemble(c: &mut Criterion) {
    let params = ProtocolParams::default();
    let mut group = c.benchmark_group("sweep/assemble");

    for count in [1u32, 10, 50, 200] {
        let inputs = utxos(count);
        group.throughput(Throughput::Elements(u64::from(count)));
        group.bench_with_input(BenchmarkId::from_parameter(count), &inputs, |b, inputs| {
            b.iter(|| assemble_sweep(inputs, DESTINATION, &params).unwrap());
        });
    }

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let params = ProtocolParams::default();
    let key = Bip32SigningKey::root(ExtendedSigningKey::from_seed(b"bench seed").unwrap());
    let mut group = c.benchmark_group("sweep/build");

    for count in [1u32, 10, 50] {
        let inputs = utxos(count);
        group.throughput(Throughput::Elements(u64::from(count)));
        group.bench_with_input(BenchmarkId::from_parameter(count), &inputs, |b, inputs| {
            b.iter(|| build_sweep(inputs, DESTINATION, &key, &params, Network::Mainnet).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_assemble, bench_build);
criterion_main!(benches);
