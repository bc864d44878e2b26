use nom::branch::alt;
use nom::bytes::complete::take_while1;
use nom::character::complete::char;
use nom::multi::{many0, separated_list1};
use nom::sequence::{delimited, pair, preceded, separated_pair};
use smallvec::SmallVec;

use crate::internal::common::parser::{NomResult, consume_all};
use crate::internal::snapshot::value::{DecodeContext, TypedValue, decode};

/// Resources granted to a claim on a single node, in the order they were listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceGrant {
    resources: SmallVec<[(String, TypedValue); 4]>,
}

impl ResourceGrant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(mut self, name: impl Into<String>, amount: TypedValue) -> Self {
        self.resources.push((name.into(), amount));
        self
    }

    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.resources
            .iter()
            .find(|(resource, _)| resource == name)
            .map(|(_, amount)| amount)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.resources
            .iter()
            .map(|(name, amount)| (name.as_str(), amount))
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Node assignment of a reservation or a job.
///
/// A node may be listed several times (one entry per chunk placed on it).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    assignments: Vec<(String, ResourceGrant)>,
}

type RawVnode<'a> = (&'a str, Vec<(&'a str, &'a str)>);

fn is_token_char(c: char) -> bool {
    !matches!(c, ':' | '+' | '(' | ')' | '=') && !c.is_whitespace()
}

fn p_token(input: &str) -> NomResult<&str> {
    take_while1(is_token_char)(input)
}

fn p_resource(input: &str) -> NomResult<(&str, &str)> {
    separated_pair(p_token, char('='), p_token)(input)
}

fn p_vnode(input: &str) -> NomResult<RawVnode> {
    pair(p_token, many0(preceded(char(':'), p_resource)))(input)
}

fn p_vnodes(input: &str) -> NomResult<Vec<RawVnode>> {
    separated_list1(char('+'), p_vnode)(input)
}

fn p_chunk(input: &str) -> NomResult<Vec<RawVnode>> {
    alt((delimited(char('('), p_vnodes, char(')')), p_vnodes))(input)
}

fn p_placement(input: &str) -> NomResult<Vec<Vec<RawVnode>>> {
    separated_list1(char('+'), p_chunk)(input)
}

impl Placement {
    pub fn new(assignments: Vec<(String, ResourceGrant)>) -> Self {
        Placement { assignments }
    }

    /// Parses an `exec_vnode`/`resv_nodes` string such as
    /// `(node1:ncpus=2:mem=1gb)+(node2:ncpus=2)`.
    pub fn parse(text: &str, ctx: &DecodeContext) -> crate::Result<Self> {
        let chunks = consume_all(p_placement, text.trim())?;
        let assignments = chunks
            .into_iter()
            .flatten()
            .map(|(node, resources)| {
                let grant = resources
                    .into_iter()
                    .fold(ResourceGrant::new(), |grant, (name, raw)| {
                        grant.with_resource(name, decode(raw, ctx))
                    });
                (node.to_string(), grant)
            })
            .collect();
        Ok(Placement { assignments })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResourceGrant)> {
        self.assignments
            .iter()
            .map(|(node, grant)| (node.as_str(), grant))
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}
