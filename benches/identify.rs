use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use filetriage::ident::cascade;
use filetriage::ident::BuiltinScanner;
use filetriage::{fileinfo_bytes, ident};
use std::hint::black_box;

fn samples() -> Vec<(&'static str, Vec<u8>)> {
    let mut pe = vec![0u8; 0x400];
    pe[..2].copy_from_slice(b"MZ");
    pe[0x3c..0x40].copy_from_slice(&0x80u32.to_le_bytes());
    pe[0x80..0x84].copy_from_slice(b"PE\0\0");
    pe[0x84..0x86].copy_from_slice(&0x8664u16.to_le_bytes());
    pe[0x96..0x98].copy_from_slice(&0x0022u16.to_le_bytes());
    pe[0x98..0x9a].copy_from_slice(&0x020bu16.to_le_bytes());

    let script = b"import os\nfor name in os.listdir('.'):\n    print(name)\n".repeat(200);
    let noise: Vec<u8> = (0..64 * 1024u32).map(|i| (i.wrapping_mul(2_654_435_761) >> 13) as u8).collect();
    let pdf: Vec<u8> = [&b"%PDF-1.7\n"[..], &vec![b' '; 32 * 1024][..], &b"/Encrypt"[..]].concat();

    vec![("pe64", pe), ("python", script), ("noise", noise), ("pdf", pdf)]
}

fn bench_ident(c: &mut Criterion) {
    let mut group = c.benchmark_group("ident");
    for (name, data) in samples() {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(name, |b| b.iter(|| ident(black_box(&data), data.len(), None)));
    }
    group.finish();
}

fn bench_fileinfo(c: &mut Criterion) {
    let mut group = c.benchmark_group("fileinfo");
    for (name, data) in samples() {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(name, |b| b.iter(|| fileinfo_bytes(black_box(&data))));
    }
    group.finish();
}

fn bench_cascade(c: &mut Criterion) {
    let labels: Vec<Vec<u8>> = samples()
        .iter()
        .flat_map(|(_, d)| BuiltinScanner::detect(d))
        .map(|d| d.label.into_bytes())
        .collect();
    c.bench_function("cascade/builtin_labels", |b| {
        b.iter(|| cascade::resolve(black_box(&labels)))
    });
}

criterion_group!(benches, bench_ident, bench_fileinfo, bench_cascade);
criterion_main!(benches);
