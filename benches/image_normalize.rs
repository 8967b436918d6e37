//! Image Normalization Benchmarks
//!
//! Decode + RGB + JPEG re-encode cost for typical scan sizes.
//!
//! Run with: `cargo bench --bench image_normalize`

use std::io::Cursor;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use pamphlets_server::imaging::{normalize, DEFAULT_JPEG_QUALITY};

/// Noisy RGBA PNG so the encoder has real work to do
fn create_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x.wrapping_mul(7) % 256) as u8,
            (y.wrapping_mul(13) % 256) as u8,
            ((x ^ y).wrapping_mul(5) % 256) as u8,
            200,
        ])
    });

    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("Failed to encode PNG");
    buf
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    group.measurement_time(Duration::from_secs(10));

    for (width, height) in [(256, 256), (1240, 1754)] {
        let png = create_png(width, height);
        group.throughput(Throughput::Bytes(png.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("png_to_jpeg", format!("{}x{}", width, height)),
            &png,
            |b, data| {
                b.iter(|| {
                    let jpeg = normalize(black_box(data.as_slice()), DEFAULT_JPEG_QUALITY)
                        .expect("Failed to normalize");
                    black_box(jpeg)
                });
            },
        );
    }

    group.finish();
}

fn bench_quality(c: &mut Criterion) {
    let mut group = c.benchmark_group("jpeg_quality");
    let png = create_png(800, 600);

    for quality in [50u8, 85, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(quality), &quality, |b, &quality| {
            b.iter(|| normalize(black_box(png.as_slice()), quality).expect("Failed to normalize"));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_quality);
criterion_main!(benches);
