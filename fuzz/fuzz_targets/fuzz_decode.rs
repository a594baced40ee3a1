#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Bounds come straight from 16-bit rectangles; cap the output buffer
    let limits = zenpict::Limits {
        max_pixels: Some(1 << 22),
        ..Default::default()
    };

    // Header phase and full decode must never panic
    let _ = zenpict::probe_pict(data);
    let _ = zenpict::DecodeRequest::new(data)
        .with_limits(&limits)
        .decode(enough::Unstoppable);

    // Same input without the JPEG sub-decoder
    let _ = zenpict::DecodeRequest::new(data)
        .with_limits(&limits)
        .without_jpeg()
        .decode(enough::Unstoppable);
});
