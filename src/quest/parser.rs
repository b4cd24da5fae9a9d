//! Reader for the quest definition record file.
//!
//! ```text
//! #500
//! The Rat King~
//! Slay the rat king lurking in the sewers.~
//! The mayor wants the rat king dead. Bring him peace.
//! ~
//! The mayor thanks you.~
//! The mayor sighs.~
//! 3 3001 ab 700 -1 -1 -1
//! 10 5 5 50 10 -1 1
//! 100 500 -1
//! S
//! $
//! ```
//!
//! Each record has five `~`-terminated text blocks (name, description,
//! accept info, completion text, quit text), three numeric lines and an `S`
//! terminator. The file ends with `$`. Any deviation is an error, and the
//! caller is expected to abort the boot on it.

use crate::quest::errors::QuestError;
use crate::quest::types::{
    MobVnum, ObjVnum, QuestDefinition, QuestFlags, QuestId, QuestLinks, QuestType, RewardBundle,
    QUEST_VALUE_SLOTS,
};

/// Line cursor that remembers 1-based line numbers for error reporting.
struct RecordReader<'a> {
    lines: std::str::Lines<'a>,
    line_no: usize,
}

impl<'a> RecordReader<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            lines: src.lines(),
            line_no: 0,
        }
    }

    fn next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.next()?;
        self.line_no += 1;
        Some(line.strip_suffix('\r').unwrap_or(line))
    }

    fn next_nonblank(&mut self) -> Option<&'a str> {
        loop {
            let line = self.next_line()?;
            if !line.trim().is_empty() {
                return Some(line);
            }
        }
    }

    fn error(&self, message: impl Into<String>) -> QuestError {
        QuestError::parse(self.line_no, message)
    }

    /// Read a `~`-terminated text block. Lines are joined with `\n`;
    /// anything after the `~` on the closing line is ignored.
    fn text_block(&mut self, what: &str) -> Result<String, QuestError> {
        let mut out = String::new();
        loop {
            let line = self
                .next_line()
                .ok_or_else(|| self.error(format!("unterminated {} text block", what)))?;
            if let Some(pos) = line.find('~') {
                out.push_str(&line[..pos]);
                return Ok(out);
            }
            out.push_str(line);
            out.push('\n');
        }
    }

    fn fields(&mut self, what: &str, expected: usize) -> Result<Vec<&'a str>, QuestError> {
        let line = self
            .next_line()
            .ok_or_else(|| self.error(format!("missing {} line", what)))?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != expected {
            return Err(self.error(format!(
                "{} line needs {} fields, found {}",
                what,
                expected,
                fields.len()
            )));
        }
        Ok(fields)
    }

    fn int(&self, field: &str, what: &str) -> Result<i32, QuestError> {
        field
            .parse::<i32>()
            .map_err(|_| self.error(format!("{} is not an integer: '{}'", what, field)))
    }
}

/// Decode a flag field: either a decimal bitvector or a run of letters,
/// `a`..`z` for bits 0..25 and `A`..`Z` for bits 26..51.
pub fn ascii_flags(field: &str) -> Option<u64> {
    if field.chars().all(|c| c.is_ascii_digit()) {
        return field.parse().ok();
    }
    let mut bits = 0u64;
    for c in field.chars() {
        let bit = match c {
            'a'..='z' => c as u32 - 'a' as u32,
            'A'..='Z' => c as u32 - 'A' as u32 + 26,
            _ => return None,
        };
        bits |= 1u64 << bit;
    }
    Some(bits)
}

/// Parse a whole quest file.
pub fn parse_quests(src: &str) -> Result<Vec<QuestDefinition>, QuestError> {
    let mut reader = RecordReader::new(src);
    let mut quests = Vec::new();

    loop {
        let header = reader
            .next_nonblank()
            .ok_or_else(|| reader.error("missing end-of-file marker '$'"))?
            .trim();
        if header == "$" {
            return Ok(quests);
        }
        let raw_id = header
            .strip_prefix('#')
            .ok_or_else(|| reader.error(format!("expected '#<id>' record header, found '{}'", header)))?;
        let id = QuestId(reader.int(raw_id.trim(), "quest id")?);
        quests.push(parse_record(&mut reader, id)?);
    }
}

fn parse_record(reader: &mut RecordReader<'_>, id: QuestId) -> Result<QuestDefinition, QuestError> {
    let name = reader.text_block("name")?;
    let description = reader.text_block("description")?;
    let info = reader.text_block("info")?;
    let completion_text = reader.text_block("completion")?;
    let quit_text = reader.text_block("quit")?;

    let head = reader.fields("quest header", 7)?;
    let type_code = reader.int(head[0], "quest type")?;
    let kind = QuestType::from_code(type_code)
        .ok_or_else(|| reader.error(format!("unknown quest type {}", type_code)))?;
    let questmaster = MobVnum::from_raw(reader.int(head[1], "questmaster")?)
        .ok_or_else(|| reader.error(format!("quest {} has no questmaster", id)))?;
    let flags = ascii_flags(head[2])
        .map(QuestFlags)
        .ok_or_else(|| reader.error(format!("bad flag string '{}'", head[2])))?;
    let target = reader.int(head[3], "target")?;
    let links = QuestLinks {
        previous: QuestId::from_raw(reader.int(head[4], "previous quest")?),
        next: QuestId::from_raw(reader.int(head[5], "next quest")?),
        prerequisite_item: ObjVnum::from_raw(reader.int(head[6], "prerequisite item")?),
    };

    let value_fields = reader.fields("value", QUEST_VALUE_SLOTS)?;
    let mut values = [0i32; QUEST_VALUE_SLOTS];
    for (slot, field) in values.iter_mut().zip(value_fields) {
        *slot = reader.int(field, "value slot")?;
    }

    let reward_fields = reader.fields("reward", 3)?;
    let reward = RewardBundle {
        points: values[0],
        gold: reader.int(reward_fields[0], "gold reward")?,
        experience: reader.int(reward_fields[1], "experience reward")?,
        item: ObjVnum::from_raw(reader.int(reward_fields[2], "item reward")?),
    };

    match reader.next_line() {
        Some(line) if line.starts_with('S') => {}
        Some(line) => {
            return Err(reader.error(format!(
                "quest {} must end with 'S', found '{}'",
                id,
                line.trim()
            )))
        }
        None => return Err(reader.error(format!("quest {} is missing its 'S' terminator", id))),
    }

    Ok(QuestDefinition {
        id,
        name,
        description,
        info,
        completion_text,
        quit_text,
        kind,
        questmaster,
        flags,
        target,
        links,
        values,
        reward,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::types::TimeLimit;

    const RAT_KING: &str = "#500
The Rat King~
Slay the rat king.~
The mayor wants the rat king dead.
Bring him peace.
~
Well done.~
~
3 3001 ab 700 499 501 -1
10 5 5 50 10 -1 1
100 500 -1
S
$
";

    #[test]
    fn parses_full_record() {
        let quests = parse_quests(RAT_KING).unwrap();
        assert_eq!(quests.len(), 1);
        let q = &quests[0];
        assert_eq!(q.id, QuestId(500));
        assert_eq!(q.name, "The Rat King");
        assert_eq!(q.info, "The mayor wants the rat king dead.\nBring him peace.\n");
        assert_eq!(q.quit_text, "");
        assert_eq!(q.kind, QuestType::MobKill);
        assert_eq!(q.questmaster, MobVnum(3001));
        assert!(q.is_repeatable());
        assert!(q.is_mob_postable());
        assert_eq!(q.target_mob(), MobVnum(700));
        assert_eq!(q.links.previous, Some(QuestId(499)));
        assert_eq!(q.links.next, Some(QuestId(501)));
        assert_eq!(q.links.prerequisite_item, None);
        assert_eq!(q.points(), 10);
        assert_eq!(q.quit_penalty(), 5);
        assert_eq!(q.time_limit(), TimeLimit::Ticks(10));
        assert_eq!(q.reward.gold, 100);
        assert_eq!(q.reward.experience, 500);
        assert_eq!(q.reward.points, 10);
        assert_eq!(q.reward.item, None);
    }

    #[test]
    fn ascii_flags_accepts_letters_and_numbers() {
        assert_eq!(ascii_flags("0"), Some(0));
        assert_eq!(ascii_flags("3"), Some(3));
        assert_eq!(ascii_flags("b"), Some(2));
        assert_eq!(ascii_flags("aB"), Some(1 | (1 << 27)));
        assert_eq!(ascii_flags("a-"), None);
    }

    #[test]
    fn wrong_field_count_is_fatal() {
        let src = RAT_KING.replace("10 5 5 50 10 -1 1", "10 5 5 50 10 -1");
        match parse_quests(&src) {
            Err(QuestError::Parse { line, message }) => {
                assert_eq!(line, 10);
                assert!(message.contains("value line"), "{}", message);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn missing_terminator_is_fatal() {
        let src = RAT_KING.replace("S\n$", "X\n$");
        assert!(matches!(parse_quests(&src), Err(QuestError::Parse { line: 12, .. })));
    }

    #[test]
    fn unterminated_text_is_fatal() {
        let src = "#1\nname without tilde\n";
        assert!(matches!(parse_quests(src), Err(QuestError::Parse { .. })));
    }

    #[test]
    fn missing_dollar_is_fatal() {
        let src = RAT_KING.replace("$\n", "");
        assert!(parse_quests(&src).is_err());
    }

    #[test]
    fn empty_file_with_marker_is_fine() {
        assert!(parse_quests("$\n").unwrap().is_empty());
    }
}
