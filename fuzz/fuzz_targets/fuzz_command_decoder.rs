//! Fuzz target: `codec::decode_command`
//!
//! Splits the input at the first NUL into a topic and a payload and feeds
//! both to the command decoder.  It must never panic, and any accepted
//! topic must sit beneath the command namespace.
//!
//! cargo fuzz run fuzz_command_decoder

#![no_main]

use doorctl::app::commands::DoorCommand;
use doorctl::codec::decode_command;
use libfuzzer_sys::fuzz_target;

const BASE: &str = "esp32/door";

fuzz_target!(|data: &[u8]| {
    let (topic, payload) = match data.iter().position(|b| *b == 0) {
        Some(i) => (&data[..i], &data[i + 1..]),
        None => (data, &[][..]),
    };
    let Ok(topic) = core::str::from_utf8(topic) else {
        return;
    };

    if let Ok(cmd) = decode_command(BASE, topic, payload) {
        assert!(topic.starts_with("esp32/door/cmd/"));
        if let DoorCommand::SetRunTimer(ms) | DoorCommand::SetTimerCA(ms) = cmd {
            assert!(ms > 0 && ms < 60_000, "timer escaped range check");
        }
    }
});
