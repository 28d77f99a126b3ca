/// Reply format a template asks the model for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `SUMMARY:` / `ACTIONITEMS:` sections
    Delimited,
    /// A single JSON object with `summary` and `items`
    Json,
}

/// A versioned prompt template.
#[derive(Debug)]
pub struct PromptTemplate {
    pub version: &'static str,
    pub format: OutputFormat,
    instructions: &'static str,
}

impl PromptTemplate {
    /// Look up a registered template by version string.
    pub fn lookup(version: &str) -> Option<&'static PromptTemplate> {
        TEMPLATES.iter().find(|t| t.version == version.trim())
    }

    /// All registered versions, oldest first.
    pub fn versions() -> impl Iterator<Item = &'static str> {
        TEMPLATES.iter().map(|t| t.version)
    }

    /// Embed the transcript. Pure: same input, same bytes.
    pub fn render(&self, transcript: &str) -> String {
        let mut prompt = String::with_capacity(self.overhead() + transcript.len());
        prompt.push_str(self.instructions);
        prompt.push_str(TRANSCRIPT_HEADER);
        prompt.push_str(transcript);
        prompt.push('\n');
        prompt
    }

    /// Bytes added around the transcript by [`render`](Self::render).
    pub fn overhead(&self) -> usize {
        self.instructions.len() + TRANSCRIPT_HEADER.len() + 1
    }
}

const TRANSCRIPT_HEADER: &str = "\nTranscript:\n";

static TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        version: "v1",
        format: OutputFormat::Delimited,
        instructions: "You are a meticulous meeting assistant that writes concise, factual meeting summaries.\n\
\n\
Rules:\n\
- Use only information present in the transcript. Do not guess.\n\
- Timestamps and cue numbers are not dates.\n\
- Extract only concrete decisions and action items, no chit-chat.\n\
- If an owner or deadline is not explicitly stated, leave it out.\n\
\n\
Respond in exactly this format and nothing else:\n\
SUMMARY:\n\
<2-3 sentence summary in plain text>\n\
ACTIONITEMS:\n\
- <Owner>: <what needs to be done> (due: <deadline>)\n\
\n\
Write one action item per line. Omit \"<Owner>:\" when nobody owns the item and omit the due part when there is no deadline. If there are no action items, write None under ACTIONITEMS:.\n",
    },
    PromptTemplate {
        version: "json-v1",
        format: OutputFormat::Json,
        instructions: "You are a meticulous meeting parser.\n\
\n\
Rules:\n\
1) The input may come from a WebVTT file. Ignore any timestamps, they are not dates.\n\
2) Extract only concrete decisions and action items. No chit-chat.\n\
3) If an owner or due date is not explicitly clear, set it to \"None\". Do not guess.\n\
4) Dates must be ISO (YYYY-MM-DD). Convert natural language dates, otherwise \"None\".\n\
5) Output strict JSON per the schema below. No explanations.\n\
\n\
Return only valid JSON (no backticks, no prose), exactly:\n\
{\n\
  \"summary\": \"2-3 sentence summary of the meeting; plain text.\",\n\
  \"items\": [\n\
    {\"action\": \"what needs to be done\", \"owner\": \"person or None\", \"due\": \"YYYY-MM-DD or None\"}\n\
  ]\n\
}\n",
    },
];
