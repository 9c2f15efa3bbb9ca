//! Arbitration, client polling and statistics tests.

use std::any::Any;

use gs_memory::{ClientPort, MemoryArbiter, MemoryError, Port, PortClient, Request};
use gs_twin_core::{Rgba8, Surface};
use sdram_model::REFRESH_INTERVAL;

fn arbiter() -> MemoryArbiter {
    MemoryArbiter::with_words(1 << 16)
}

/// Tick until every listed port has completed, returning completions in
/// completion order.
fn drain(mem: &mut MemoryArbiter, ports: &[Port]) -> Vec<gs_memory::Completion> {
    let mut done = Vec::new();
    for _ in 0..10_000 {
        mem.tick();
        for &port in ports {
            if let Some(c) = mem.take_completion(port) {
                done.push(c);
            }
        }
        if done.len() == ports.len() {
            break;
        }
    }
    done
}

// ====================================================================
// Priority
// ====================================================================

mod priority {
    use super::*;

    #[test]
    fn simultaneous_requests_granted_in_priority_order() {
        let mut mem = arbiter();
        mem.submit(Port::Texture, Request::read(0, 8)).unwrap();
        mem.submit(Port::ZBuffer, Request::read(64, 8)).unwrap();
        mem.submit(Port::ColorWrite, Request::write(128, vec![1; 8])).unwrap();
        mem.submit(Port::Display, Request::read(256, 8)).unwrap();

        let done = drain(
            &mut mem,
            &[Port::Display, Port::ColorWrite, Port::ZBuffer, Port::Texture],
        );
        let order: Vec<Port> = done.iter().map(|c| c.port).collect();
        assert_eq!(
            order,
            vec![Port::Display, Port::ColorWrite, Port::ZBuffer, Port::Texture]
        );
        for pair in done.windows(2) {
            assert!(pair[0].finished < pair[1].granted + 1);
        }
    }

    #[test]
    fn grant_is_not_preempted() {
        let mut mem = arbiter();
        mem.submit(Port::Texture, Request::read(0, 64)).unwrap();
        mem.tick();
        // Display arrives after the texture burst was granted.
        mem.submit(Port::Display, Request::read(512, 4)).unwrap();
        let done = drain(&mut mem, &[Port::Texture, Port::Display]);
        assert_eq!(done[0].port, Port::Texture);
        assert_eq!(done[0].words, 64);
        assert!(done[1].granted >= done[0].finished);
    }

    #[test]
    fn one_outstanding_request_per_port() {
        let mut mem = arbiter();
        mem.submit(Port::ZBuffer, Request::read(0, 4)).unwrap();
        assert_eq!(
            mem.submit(Port::ZBuffer, Request::read(4, 4)),
            Err(MemoryError::PortBusy(Port::ZBuffer))
        );
    }

    #[test]
    fn no_grant_during_refresh() {
        let mut mem = arbiter();
        mem.advance(u64::from(REFRESH_INTERVAL));
        mem.submit(Port::Texture, Request::read(0, 1)).unwrap();
        let done = mem.take_completion(Port::Texture);
        assert!(done.is_none());
        let done = drain(&mut mem, &[Port::Texture]);
        assert!(done[0].wait() > 0, "grant should wait out the refresh");
        assert_eq!(mem.sdram().refreshes(), 1);
    }
}

// ====================================================================
// Cancel
// ====================================================================

mod cancel {
    use super::*;

    #[test]
    fn cancelled_read_delivers_partial_data() {
        let mut mem = arbiter();
        mem.write_words(0, &(0..32).collect::<Vec<u16>>());
        mem.submit(Port::Display, Request::read(0, 32)).unwrap();
        // Past activation and CAS latency, into the data phase.
        mem.advance(9);
        mem.cancel(Port::Display);
        let done = drain(&mut mem, &[Port::Display]);
        assert!(done[0].cancelled);
        assert!(done[0].words > 0 && done[0].words < 32);
        assert_eq!(done[0].data, (0..done[0].words as u16).collect::<Vec<_>>());
        assert_eq!(mem.stats(Port::Display).cancels, 1);
    }

    #[test]
    fn port_usable_after_cancel() {
        let mut mem = arbiter();
        mem.submit(Port::Texture, Request::read(0, 16)).unwrap();
        mem.advance(7);
        mem.cancel(Port::Texture);
        drain(&mut mem, &[Port::Texture]);
        mem.write_word(40, 0xBEEF);
        let done = mem.execute(Port::Texture, Request::read(40, 1)).unwrap();
        assert_eq!(done.data, vec![0xBEEF]);
    }
}

// ====================================================================
// Background client
// ====================================================================

/// Reads the same 16-word block back to back, `budget` times.
struct Streamer {
    budget: u32,
    completions: u32,
}

impl PortClient for Streamer {
    fn tick(&mut self, port: &mut ClientPort<'_>) {
        if port.take_completion().is_some() {
            self.completions += 1;
        }
        if !port.is_busy() && self.budget > 0 {
            self.budget -= 1;
            port.submit(Request::read(0, 16)).unwrap();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

mod client {
    use super::*;

    #[test]
    fn client_runs_while_pipeline_blocks() {
        let mut mem = arbiter();
        mem.attach_client(Box::new(Streamer {
            budget: 3,
            completions: 0,
        }));
        let done = mem.execute(Port::Texture, Request::read(100, 4)).unwrap();
        assert_eq!(done.words, 4);
        // The display keeps its priority while the pipeline waits.
        assert_eq!(mem.stats(Port::Display).transactions, 3);
        assert!(done.wait() > 0);
        let streamer = mem.client::<Streamer>().unwrap();
        assert!(streamer.completions >= 2);
    }

    #[test]
    fn downcast_to_wrong_type_is_none() {
        struct Other;
        impl PortClient for Other {
            fn tick(&mut self, _: &mut ClientPort<'_>) {}
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }
        let mut mem = arbiter();
        mem.attach_client(Box::new(Other));
        assert!(mem.client::<Streamer>().is_none());
        assert!(mem.client_mut::<Other>().is_some());
    }
}

// ====================================================================
// Readback
// ====================================================================

mod readback {
    use super::*;

    #[test]
    fn surface_image_detiles() {
        let mut mem = arbiter();
        let surface = Surface::new(0x200, 3, 2).unwrap();
        let red = Rgba8::new(255, 0, 0, 255).to_rgb565();
        mem.write_word(surface.word_address(5, 1), red);
        let img = mem.surface_image(&surface);
        assert_eq!(img.dimensions(), (8, 4));
        assert_eq!(img.get_pixel(5, 1).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(4, 1).0, [0, 0, 0, 255]);
    }

    #[test]
    fn dump_writes_png() {
        let mem = arbiter();
        let surface = Surface::new(0, 4, 4).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fb.png");
        mem.dump_surface_png(&surface, &path).unwrap();
        let back = image::open(&path).unwrap().to_rgba8();
        assert_eq!(back.dimensions(), (16, 16));
    }
}
