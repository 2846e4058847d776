use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sha256d_block_bench(c: &mut Criterion) {
    let data = [0xABu8; 512];

    c.bench_function("sha256d_512B", |b| {
        b.iter(|| dagcore_crypto::sha256d(black_box(&data)))
    });
}

fn ecdsa_sign_bench(c: &mut Criterion) {
    let kp = dagcore_crypto::keypair_from_seed(&[42u8; 32]).unwrap();
    let digest = dagcore_crypto::sha256d(&[42u8; 128]);

    c.bench_function("ecdsa_sign", |b| {
        b.iter(|| dagcore_crypto::sign_digest(black_box(&digest), &kp.secret))
    });
}

fn ecdsa_verify_bench(c: &mut Criterion) {
    let kp = dagcore_crypto::keypair_from_seed(&[42u8; 32]).unwrap();
    let digest = dagcore_crypto::sha256d(&[42u8; 128]);
    let sig = dagcore_crypto::sign_digest(&digest, &kp.secret).unwrap();

    c.bench_function("ecdsa_verify", |b| {
        b.iter(|| dagcore_crypto::verify_digest(black_box(&digest), &sig, &kp.public))
    });
}

criterion_group!(
    benches,
    sha256d_block_bench,
    ecdsa_sign_bench,
    ecdsa_verify_bench
);
criterion_main!(benches);
