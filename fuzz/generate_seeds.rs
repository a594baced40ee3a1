#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn header(version: u8, width: i16, height: i16) -> Vec<u8> {
    let mut v = vec![0u8; 512];
    v.extend_from_slice(&0u16.to_be_bytes());
    for c in [0, 0, height, width] {
        v.extend_from_slice(&c.to_be_bytes());
    }
    if version == 1 {
        v.extend_from_slice(&[0x11, 0x01]);
    } else {
        v.extend_from_slice(&[0x00, 0x11, 0x02, 0xFF]);
    }
    v
}

fn rect(v: &mut Vec<u8>, width: i16, height: i16) {
    for c in [0, 0, height, width] {
        v.extend_from_slice(&c.to_be_bytes());
    }
}

fn pixmap(v: &mut Vec<u8>, width: i16, height: i16, pixel_size: u16, cmp_count: u16) {
    rect(v, width, height);
    v.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0]); // version, packType, packSize
    v.extend_from_slice(&(72u32 << 16).to_be_bytes());
    v.extend_from_slice(&(72u32 << 16).to_be_bytes());
    v.extend_from_slice(&0u16.to_be_bytes());
    v.extend_from_slice(&pixel_size.to_be_bytes());
    v.extend_from_slice(&cmp_count.to_be_bytes());
    v.extend_from_slice(&8u16.to_be_bytes());
    v.extend_from_slice(&[0; 12]); // planeBytes, pmTable, pmReserved
}

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    // Version 1 bitmap 8x2
    let mut v1 = header(1, 8, 2);
    v1.push(0x90);
    v1.extend_from_slice(&1u16.to_be_bytes());
    for _ in 0..3 {
        rect(&mut v1, 8, 2);
    }
    v1.extend_from_slice(&[0, 0, 0x81, 0x7E, 0xFF]);
    fs::write(format!("{dir}/v1_bitmap.pict"), v1).unwrap();

    // Version 2 indexed 8-bit 4x4, two-color table, raw rows
    let mut indexed = header(2, 4, 4);
    indexed.extend_from_slice(&0x0098u16.to_be_bytes());
    indexed.extend_from_slice(&0x8004u16.to_be_bytes());
    pixmap(&mut indexed, 4, 4, 8, 1);
    indexed.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 1]);
    indexed.extend_from_slice(&[0, 0, 0xFF, 0xFF, 0, 0, 0, 0]);
    indexed.extend_from_slice(&[0, 1, 0, 0, 0, 0, 0xFF, 0xFF]);
    rect(&mut indexed, 4, 4);
    rect(&mut indexed, 4, 4);
    indexed.extend_from_slice(&0u16.to_be_bytes());
    indexed.extend_from_slice(&[0, 1, 1, 0, 1, 0, 0, 1, 0, 0, 1, 1, 1, 1, 0, 0]);
    indexed.extend_from_slice(&0x00FFu16.to_be_bytes());
    fs::write(format!("{dir}/v2_indexed_4x4.pict"), indexed).unwrap();

    // Version 2 DirectBits 32-bit 2x1, packed planes
    let mut direct = header(2, 2, 1);
    direct.extend_from_slice(&0x009Au16.to_be_bytes());
    direct.extend_from_slice(&[0, 0, 0, 0xFF, 0x80, 0x08]);
    pixmap(&mut direct, 2, 1, 32, 3);
    rect(&mut direct, 2, 1);
    rect(&mut direct, 2, 1);
    direct.extend_from_slice(&0x40u16.to_be_bytes());
    direct.extend_from_slice(&[7, 5, 10, 20, 30, 40, 50, 60]);
    fs::write(format!("{dir}/v2_direct_32.pict"), direct).unwrap();

    // Vector-only picture
    let mut vector = header(2, 8, 8);
    vector.extend_from_slice(&0x0022u16.to_be_bytes());
    vector.extend_from_slice(&[0; 6]);
    vector.extend_from_slice(&0x00FFu16.to_be_bytes());
    fs::write(format!("{dir}/v2_vector_only.pict"), vector).unwrap();

    println!("Seeds written to {dir}/");
}
