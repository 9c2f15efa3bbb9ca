use std::fmt;

use gs_display::DisplayStats;
use gs_memory::{Port, PortStats};
use gs_pixel_write::CoalesceStats;
use gs_tex_l1_cache::TexCacheStats;
use gs_zbuf::ZCacheStats;

use crate::pipeline::PipelineStats;

/// Counters from every unit since the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TwinStats {
    pub pipeline: PipelineStats,
    pub tex: [TexCacheStats; 2],
    pub zbuf: ZCacheStats,
    pub coalesce: CoalesceStats,
    /// Indexed in [`Port::ALL`] order.
    pub ports: [PortStats; Port::COUNT],
    /// Arbiter clock at the time of the snapshot.
    pub cycles: u64,
    pub display: Option<DisplayStats>,
}

impl TwinStats {
    #[must_use]
    pub fn port(&self, port: Port) -> PortStats {
        self.ports[port.index()]
    }
}

impl fmt::Display for TwinStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.pipeline)?;
        for (unit, t) in self.tex.iter().enumerate() {
            writeln!(
                f,
                "tex{unit} cache: {} hits, {} misses ({:.1}%), {} invalidations",
                t.hits,
                t.misses,
                100.0 * t.hit_rate(),
                t.invalidations
            )?;
        }
        writeln!(
            f,
            "z cache:    {} hits, {} misses ({:.1}%), {} write-backs",
            self.zbuf.hits,
            self.zbuf.misses,
            100.0 * self.zbuf.hit_rate(),
            self.zbuf.write_backs
        )?;
        writeln!(
            f,
            "coalescer:  {} writes in {} bursts ({:.2} words/burst), {} reads forwarded",
            self.coalesce.writes,
            self.coalesce.bursts,
            self.coalesce.words_per_burst(),
            self.coalesce.forwarded
        )?;
        for port in Port::ALL {
            let p = self.port(port);
            writeln!(
                f,
                "port {port:<12} {:>8} txns {:>10} words  wait mean {:.1} max {}  cancels {}",
                p.transactions,
                p.words,
                p.mean_wait(),
                p.max_wait,
                p.cancels
            )?;
        }
        if let Some(d) = &self.display {
            writeln!(
                f,
                "display:    {} frames, {} lines, {} underruns, {} retargets",
                d.frames, d.lines, d.underruns, d.retargets
            )?;
        }
        write!(f, "cycles:     {}", self.cycles)
    }
}
