// Benchmark for reply framing and payload parsing
// Run with: cargo bench

use criterion::{Criterion, criterion_group, criterion_main};
use flashforge_rs::communication::ResponseFramer;
use flashforge_rs::parser::{INFO_SCHEMA, key_value, progress};

const MODE_REPLY: &[u8] = b"CMD M601 Received.\r\nControl Success V2.1.\r\nok\r\n";
const INFO_REPLY: &[u8] = b"CMD M115 Received.\r\nMachine Type: Flashforge Adventurer 4\r\nMachine Name: Workshop\r\nFirmware: v2.2.3\r\nSN: SNADVA9501234\r\nX: 110.5 Y: 20 Z: 150\r\nTool Count: 1\r\nMac Address:88:A9:A7:90:D6:4C\r\nok\r\n";

fn bench_framer(c: &mut Criterion) {
    // Deliver the reply a few bytes at a time to exercise accumulation.
    let chunks: Vec<&[u8]> = INFO_REPLY.chunks(16).collect();
    c.bench_function("frame info reply in 16 byte chunks", |b| {
        b.iter(|| {
            let mut framer = ResponseFramer::new();
            framer.feed(MODE_REPLY).unwrap();
            let mut payload = None;
            for chunk in &chunks {
                payload = framer.feed(chunk).unwrap();
            }
            assert_eq!(payload.unwrap().lines().len(), 7);
        });
    });
}

fn bench_parsers(c: &mut Criterion) {
    let info = "Machine Type: Flashforge Adventurer 4\r\nMachine Name: Workshop\r\nFirmware: v2.2.3\r\nSN: SNADVA9501234\r\nX: 110.5 Y: 20 Z: 150\r\nTool Count: 1\r\nMac Address:88:A9:A7:90:D6:4C\r";
    c.bench_function("parse info payload", |b| {
        b.iter(|| key_value::parse(info, INFO_SCHEMA).unwrap());
    });
    c.bench_function("parse progress payload", |b| {
        b.iter(|| progress::parse("SD printing byte 12345/54321\r\nLayer: 12/200\r").unwrap());
    });
}

criterion_group!(benches, bench_framer, bench_parsers);
criterion_main!(benches);
