//! Benchmarks for conversion decisions and encoding.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, Rgba, RgbaImage};
use uic_image::encode::encode_to_writer;
use uic_image::{png_compression_level, should_convert, ConversionConfig, Quality, TargetFormat};

fn bench_eligibility(c: &mut Criterion) {
    let config = ConversionConfig::default();

    c.bench_function("should_convert_allowed", |b| {
        b.iter(|| should_convert(black_box("image/png"), black_box(&config)))
    });

    c.bench_function("should_convert_rejected", |b| {
        b.iter(|| should_convert(black_box("image/tiff"), black_box(&config)))
    });
}

fn bench_png_level(c: &mut Criterion) {
    c.bench_function("png_compression_level", |b| {
        b.iter(|| {
            for q in 1..=100u8 {
                black_box(png_compression_level(Quality::new(q).unwrap()));
            }
        })
    });
}

fn bench_encode(c: &mut Criterion) {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(256, 256, |x, y| {
        Rgba([x as u8, y as u8, (x ^ y) as u8, 255])
    }));
    let quality = Quality::default();

    for format in [TargetFormat::Png, TargetFormat::Jpeg] {
        c.bench_function(&format!("encode_{}_256", format), |b| {
            b.iter(|| {
                let mut out = Vec::new();
                encode_to_writer(black_box(&img), &mut out, format, quality).unwrap();
                out
            })
        });
    }
}

criterion_group!(benches, bench_eligibility, bench_png_level, bench_encode);
criterion_main!(benches);
