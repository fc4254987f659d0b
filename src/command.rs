//! Top-level build: parse the template, expand every group, hand back a generator.
use log::{debug, warn};

use crate::config::Config;
use crate::error::LupResult;
use crate::expansion::expand_term;
use crate::generate::{parse_backref, Generator, Group, Template, Term};
use crate::parse::parse_template;

/// Join process arguments the way a shell would need them quoted.
pub fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    shell_words::join(tokens.iter().map(AsRef::as_ref))
}

pub fn build<S: AsRef<str>>(tokens: &[S], config: &Config) -> LupResult<Generator> {
    build_line(&join_tokens(tokens), config)
}

pub fn build_line(line: &str, config: &Config) -> LupResult<Generator> {
    let mut parsed = parse_template(line, config)?;
    let mut groups = Vec::with_capacity(parsed.groups.len());
    let mut absorbed_groups = Vec::new();

    for (idx, raw) in parsed.groups.iter().enumerate() {
        let mut terms = Vec::new();
        let mut absorbed = false;
        for raw_term in &raw.raw_terms {
            let expanded = expand_term(raw_term, raw.external_path.as_deref(), config.delimiter)?;
            absorbed |= expanded.absorbed;
            let node = expanded.nodes;
            terms.extend(expanded.terms.into_iter().map(|value| Term { value, node }));
        }
        if terms.is_empty() {
            warn!("group {} produced no terms; nothing will be generated", idx + 1);
        }
        if absorbed {
            absorbed_groups.push(idx);
        }
        debug!(
            "build event=group index={} hidden={} terms={} absorbed={}",
            idx,
            raw.hidden,
            terms.len(),
            absorbed
        );
        groups.push(Group {
            hidden: raw.hidden,
            terms,
            external_path: raw.external_path.clone(),
            absorbed,
            quote: raw.quote,
            backref: parse_backref(&raw.raw_terms),
        });
    }

    for idx in absorbed_groups {
        parsed.absorb_external_path(idx);
    }
    let template = Template::new(parsed.segments, config.delimiter);
    Generator::new(template, groups)
}
