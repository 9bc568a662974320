use chartrealize::{Edge, Lf, Realization, RealizationStatus, RealizerConfig};
use std::io::{self, Write};

/// Report colors. Each tone names what is being shown, not the ANSI code.
#[derive(Debug, Clone, Copy)]
enum Tone {
    /// Realized surfaces and success lines.
    Good,
    /// Budget and failure notices, EP ids.
    Warn,
    /// Sub-headings, categories and policy names.
    Label,
    /// Title and search timing.
    Accent,
    /// Section rules and row indices.
    Rule,
}

impl Tone {
    fn code(self) -> &'static str {
        match self {
            Tone::Good => "\x1b[32m",
            Tone::Warn => "\x1b[33m",
            Tone::Label => "\x1b[34m",
            Tone::Accent => "\x1b[36m",
            Tone::Rule => "\x1b[90m",
        }
    }
}

struct Palette {
    enabled: bool,
}

impl Palette {
    const RESET: &'static str = "\x1b[0m";

    fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn wrap(&self, code: &str, s: impl AsRef<str>) -> String {
        if self.enabled { format!("{code}{}{}", s.as_ref(), Self::RESET) } else { s.as_ref().to_string() }
    }

    fn tone(&self, s: impl AsRef<str>, tone: Tone) -> String {
        self.wrap(tone.code(), s)
    }

    fn strong(&self, s: impl AsRef<str>) -> String {
        self.wrap("\x1b[1m", s)
    }

    fn dim(&self, s: impl AsRef<str>) -> String {
        self.wrap("\x1b[2m", s)
    }
}

/// Write the full diagnostic report for one request to `out`.
pub fn write_run(
    out: &mut impl Write,
    lf: &Lf,
    config: &RealizerConfig,
    result: &Realization,
    color: bool,
) -> io::Result<()> {
    let palette = Palette::new(color);
    writeln!(out, "\n{}", palette.strong(palette.tone(format!("⚙  Realizing: {lf}"), Tone::Accent)))?;

    section(out, &palette, "Input")?;
    write_input(out, lf, config, &palette)?;

    section(out, &palette, "Complete edges")?;
    let unsorted = result.complete_edges(false);
    if unsorted.is_empty() {
        writeln!(out, "{}", palette.dim("  No complete edges"))?;
    } else {
        writeln!(out, "  {}", palette.tone("in chart order:", Tone::Label))?;
        write_edges(out, &unsorted, &palette)?;
        writeln!(out, "  {}", palette.tone("by score:", Tone::Label))?;
        write_edges(out, &result.complete_edges(true), &palette)?;
    }

    section(out, &palette, "Best edge")?;
    match result.best_edge() {
        Some(edge) => write_best(out, result, edge, &palette)?,
        None => writeln!(out, "{}", palette.dim("  none"))?,
    }

    if let Some(joined) = result.best_joined_edge() {
        section(out, &palette, "Best joined edge")?;
        write_best(out, result, joined, &palette)?;
    }

    section(out, &palette, "Status")?;
    write_status(out, result, &palette)?;

    section(out, &palette, "Timing")?;
    let m = result.metrics();
    writeln!(
        out,
        "  Total: {}  │  Seeding: {}  │  Search: {}  │  Join: {}",
        palette.tone(format!("{:?}", m.total), Tone::Good),
        palette.dim(format!("{:?}", m.seeding)),
        palette.tone(format!("{:?}", m.search), Tone::Accent),
        palette.dim(format!("{:?}", m.join)),
    )?;
    writeln!(out)
}

fn section(out: &mut impl Write, palette: &Palette, title: &str) -> io::Result<()> {
    writeln!(out, "\n{}", palette.tone(format!("━━━ {title} ━━━"), Tone::Rule))
}

fn write_input(out: &mut impl Write, lf: &Lf, config: &RealizerConfig, palette: &Palette) -> io::Result<()> {
    for (id, ep) in lf.eps().iter().enumerate() {
        writeln!(out, "  {} {}", palette.tone(format!("ep{id}"), Tone::Warn), ep)?;
    }
    for chunk in lf.chunks() {
        writeln!(out, "  {} {:?}", palette.dim("chunk:"), chunk)?;
    }
    for chunk in lf.optional_chunks() {
        writeln!(out, "  {} {:?}", palette.dim("optional:"), chunk)?;
    }
    let or = |v: &Option<String>, none: &str| v.clone().unwrap_or_else(|| none.to_string());
    writeln!(
        out,
        "  {} {}  {} {}  {} {}  {} {}",
        palette.dim("pruning:"),
        palette.tone(or(&config.pruning_strategy, "none"), Tone::Label),
        palette.dim("│ hypertagger:"),
        palette.tone(or(&config.hypertagger, "none"), Tone::Label),
        palette.dim("│ edge budget:"),
        config.edge_budget.map_or("unlimited".to_string(), |n| n.to_string()),
        palette.dim("│ time budget:"),
        config.time_budget.map_or("unlimited".to_string(), |d| format!("{d:?}")),
    )
}

fn write_edges(out: &mut impl Write, edges: &[&Edge], palette: &Palette) -> io::Result<()> {
    for (idx, edge) in edges.iter().enumerate() {
        writeln!(
            out,
            "    {} {} {} {} {}",
            palette.tone(format!("[{idx}]"), Tone::Rule),
            palette.strong(palette.tone(edge.surface(), Tone::Good)),
            palette.dim("│"),
            palette.tone(edge.category().to_string(), Tone::Label),
            palette.dim(format!("score {:.4}  cov {}", edge.score(), edge.coverage())),
        )?;
    }
    Ok(())
}

fn write_best(out: &mut impl Write, result: &Realization, edge: &Edge, palette: &Palette) -> io::Result<()> {
    writeln!(
        out,
        "  {}  {}",
        palette.strong(palette.tone(edge.surface(), Tone::Good)),
        palette.dim(format!("score {:.4}", edge.score())),
    )?;
    writeln!(out, "  {}", palette.tone("derivation:", Tone::Label))?;
    for line in result.derivation(edge).to_string().lines() {
        writeln!(out, "    {line}")?;
    }
    Ok(())
}

fn write_status(out: &mut impl Write, result: &Realization, palette: &Palette) -> io::Result<()> {
    let status = result.status();
    let headline = if status.contains(RealizationStatus::COMPLETE) {
        palette.tone("✓ complete realization", Tone::Good)
    } else if status.contains(RealizationStatus::JOINED) {
        palette.tone("~ joined fragments only", Tone::Warn)
    } else {
        palette.tone("✗ no realization found", Tone::Warn)
    };
    writeln!(out, "  {headline}")?;
    if result.is_partial() {
        writeln!(out, "  {}", palette.tone("budget exceeded: result may be suboptimal", Tone::Warn))?;
    }

    let m = result.metrics();
    writeln!(
        out,
        "  {} {}  {} {}  {} {}  {} {}  {} {}  {} {}",
        palette.dim("seeds:"),
        m.seeds,
        palette.dim("│ created:"),
        m.created,
        palette.dim("│ stored:"),
        m.accepted,
        palette.dim("│ dominated:"),
        m.dominated,
        palette.dim("│ pruned:"),
        m.pruned,
        palette.dim("│ expansions:"),
        m.expansions,
    )?;
    writeln!(
        out,
        "  {} {}  {} {}",
        palette.dim("live edges:"),
        result.chart().len(),
        palette.dim("│ arena:"),
        result.chart().arena_len()
    )
}
