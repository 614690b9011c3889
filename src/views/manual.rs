//! Static user guide.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManualSection {
    pub title: &'static str,
    pub paragraphs: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManualView {
    pub sections: &'static [ManualSection],
}

impl ManualView {
    pub fn build() -> Self {
        Self { sections: SECTIONS }
    }
}

const SECTIONS: &[ManualSection] = &[
    ManualSection {
        title: "Getting started",
        paragraphs: &[
            "Paste log text or select one or more files on the Upload screen, then start the analysis.",
            "No backend available? Load the demo data to explore every screen with a synthetic incident.",
        ],
    },
    ManualSection {
        title: "Input formats",
        paragraphs: &[
            "Plain logs: one entry per line, shaped like `[2024-01-15T10:00:00] [ERROR] [OrderService] message`.",
            "Metric lines carry tokens such as `CPU: 85%`, `MEM: 2048MB` and `Duration: 3200ms`.",
            "CSV files need a header row; JSON files may hold a list of records or a single object.",
            "Accepted extensions are .log, .txt, .json and .csv.",
        ],
    },
    ManualSection {
        title: "Pre-analysis",
        paragraphs: &[
            "The sensing layer counts log levels, lists the components it saw and charts CPU, memory and latency.",
            "The health score runs from 0 to 100; below 50 is critical and below 80 is degraded.",
            "Anomalies and correlations are computed by the analysis service without any AI involvement.",
        ],
    },
    ManualSection {
        title: "LLM insights",
        paragraphs: &[
            "The reasoning layer summarizes the incident and ranks bottlenecks by severity.",
            "Each bottleneck names a root cause, a recommendation and the affected component.",
            "Some service versions return a single root cause with immediate actions and short-term fixes instead.",
        ],
    },
    ManualSection {
        title: "Exports",
        paragraphs: &[
            "Download the pre-analysis as a JSON snapshot for further processing.",
            "Download the insights as a standalone HTML report that opens in any browser.",
        ],
    },
];
