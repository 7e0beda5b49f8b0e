//! `EXPECT` command, amount expectations
//!
//! `EXPECT MAX 5 CHARS` and `EXPECT MAXIMUM 5 CHARACTERS` are the same
//! command. Units match by full name, singular or unambiguous prefix.

use super::{expect_no_more_args, next_arg};
use crate::command::parser::foreign_command;
use crate::command::{CommandInput, CommandParser, UsagePlace};
use crate::error::{ApplyError, ApplyResult, ParseError, Result};
use promptbook_core::{
    Command, ExpectSign, ExpectationAmount, ExpectationUnit, PipelineBuilder, TaskBuilder,
    TaskJson,
};

fn parse_sign(raw: &str) -> Result<ExpectSign> {
    let sign = raw.to_uppercase();
    if sign.starts_with("EXACT") {
        Ok(ExpectSign::Exactly)
    } else if sign.starts_with("MIN") {
        Ok(ExpectSign::Minimum)
    } else if sign.starts_with("MAX") {
        Ok(ExpectSign::Maximum)
    } else {
        Err(ParseError::invalid_value(
            "sign",
            format!(
                "Invalid sign \"{}\", expected EXACTLY, MINIMUM or MAXIMUM",
                raw
            ),
        ))
    }
}

fn parse_amount(raw: &str) -> Result<u32> {
    let amount: f64 = raw
        .parse()
        .map_err(|_| ParseError::invalid_value("amount", format!("\"{}\" is not a number", raw)))?;

    if amount < 0.0 {
        return Err(ParseError::invalid_value(
            "amount",
            "Amount must be positive number or zero",
        ));
    }
    if amount.fract() != 0.0 {
        return Err(ParseError::invalid_value("amount", "Amount must be whole number"));
    }
    if amount > f64::from(u32::MAX) {
        return Err(ParseError::invalid_value("amount", "Amount is too large"));
    }

    Ok(amount as u32)
}

/// Resolve a unit by full name, singular or unambiguous prefix
pub(crate) fn parse_unit(raw: &str) -> Result<ExpectationUnit> {
    let unit = raw.to_uppercase();
    if unit.is_empty() {
        return Err(ParseError::missing("unit"));
    }

    if let Some(exact) = ExpectationUnit::ALL
        .into_iter()
        .find(|u| u.plural() == unit || u.singular() == unit)
    {
        return Ok(exact);
    }

    let stem = unit.strip_suffix('S').filter(|stem| !stem.is_empty());
    let candidates: Vec<ExpectationUnit> = ExpectationUnit::ALL
        .into_iter()
        .filter(|u| {
            u.plural().starts_with(unit.as_str())
                || stem.is_some_and(|stem| u.plural().starts_with(stem))
        })
        .collect();

    match candidates.as_slice() {
        [unit] => Ok(*unit),
        [] => Err(ParseError::invalid_value(
            "unit",
            format!(
                "Invalid unit \"{}\", supported units are {}",
                raw,
                ExpectationUnit::ALL
                    .iter()
                    .map(|u| u.plural())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        )),
        many => Err(ParseError::invalid_value(
            "unit",
            format!(
                "Ambiguous unit \"{}\", it could be {}",
                raw,
                many.iter()
                    .map(|u| u.plural().to_lowercase())
                    .collect::<Vec<_>>()
                    .join(" or ")
            ),
        )),
    }
}

/// Sets an expected amount of characters, words, sentences, ... of the result
pub struct ExpectCommandParser;

impl CommandParser for ExpectCommandParser {
    fn name(&self) -> &'static str {
        "EXPECT"
    }

    fn command_type(&self) -> &'static str {
        "EXPECT_AMOUNT"
    }

    fn description(&self) -> &'static str {
        "Expected amount of characters, words, sentences, lines, paragraphs or pages of the result"
    }

    fn usage_places(&self) -> &'static [UsagePlace] {
        &[UsagePlace::PipelineTask]
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            "EXPECT MIN 100 Characters",
            "EXPECT MAX 10 Words",
            "EXPECT EXACTLY 3 Sentences",
            "EXPECT EXACTLY 1 Paragraph",
            "Expect max 1 line",
            "EXPECT MAX 5 CHARS",
            "EXPECT MINIMUM 1 PAGE",
        ]
    }

    fn parse(&self, input: CommandInput) -> Result<Command> {
        let mut args = input.args;
        let sign = parse_sign(&next_arg(&mut args, "sign")?)?;
        let amount = parse_amount(&next_arg(&mut args, "amount")?)?;
        let unit = parse_unit(&next_arg(&mut args, "unit")?)?;
        expect_no_more_args(&args)?;

        Ok(Command::ExpectAmount { sign, unit, amount })
    }

    fn stringify(&self, command: &Command) -> Option<String> {
        match command {
            Command::ExpectAmount { sign, unit, amount } => Some(format!(
                "EXPECT {} {} {}",
                sign.as_str(),
                amount,
                unit.plural()
            )),
            _ => None,
        }
    }

    fn apply_to_task(
        &self,
        command: &Command,
        task: &mut TaskBuilder,
        _pipeline: &mut PipelineBuilder,
    ) -> ApplyResult<()> {
        let Command::ExpectAmount { sign, unit, amount } = command else {
            return Err(foreign_command(self, command));
        };

        let bounds = task.expectations.entry(*unit).or_default();
        let what = |bound: &str| format!("{} {} of the task \"{}\"", bound, unit.plural(), task.title);

        let set = |slot: &mut Option<u32>, bound: &str| -> ApplyResult<()> {
            match *slot {
                Some(existing) if existing != *amount => {
                    Err(ApplyError::redefinition(what(bound), existing, amount))
                }
                _ => {
                    *slot = Some(*amount);
                    Ok(())
                }
            }
        };

        let mut next = *bounds;
        match sign {
            ExpectSign::Exactly => {
                set(&mut next.min, "Minimum")?;
                set(&mut next.max, "Maximum")?;
            }
            ExpectSign::Minimum => set(&mut next.min, "Minimum")?,
            ExpectSign::Maximum => set(&mut next.max, "Maximum")?,
        }

        if let (Some(min), Some(max)) = (next.min, next.max) {
            if min > max {
                return Err(ApplyError::Invalid(format!(
                    "Minimum {} ({}) can not be greater than maximum ({}) in the task \"{}\"",
                    unit.plural(),
                    min,
                    max,
                    task.title
                )));
            }
        }

        *bounds = next;
        Ok(())
    }

    fn take_from_task(&self, task: &TaskJson) -> Vec<Command> {
        let mut commands = Vec::new();
        for (unit, ExpectationAmount { min, max }) in &task.expectations {
            match (min, max) {
                (Some(min), Some(max)) if min == max => commands.push(Command::ExpectAmount {
                    sign: ExpectSign::Exactly,
                    unit: *unit,
                    amount: *min,
                }),
                _ => {
                    if let Some(min) = min {
                        commands.push(Command::ExpectAmount {
                            sign: ExpectSign::Minimum,
                            unit: *unit,
                            amount: *min,
                        });
                    }
                    if let Some(max) = max {
                        commands.push(Command::ExpectAmount {
                            sign: ExpectSign::Maximum,
                            unit: *unit,
                            amount: *max,
                        });
                    }
                }
            }
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::parse_command;

    fn parse(line: &str) -> Result<Command> {
        parse_command(line, UsagePlace::PipelineTask)
    }

    #[test]
    fn test_short_and_long_forms_are_equal() {
        let expected = Command::ExpectAmount {
            sign: ExpectSign::Maximum,
            unit: ExpectationUnit::Characters,
            amount: 5,
        };
        assert_eq!(parse("EXPECT MAX 5 CHARS").unwrap(), expected);
        assert_eq!(parse("EXPECT MAXIMUM 5 CHARACTERS").unwrap(), expected);
    }

    #[test]
    fn test_ambiguous_unit() {
        let message = parse("EXPECT exactly 2 p").unwrap_err().to_string();
        assert!(message.contains("Ambiguous unit \"p\""), "{}", message);
    }

    #[test]
    fn test_unit_matching() {
        assert_eq!(parse_unit("Words").unwrap(), ExpectationUnit::Words);
        assert_eq!(parse_unit("page").unwrap(), ExpectationUnit::Pages);
        assert_eq!(parse_unit("sent").unwrap(), ExpectationUnit::Sentences);
        assert_eq!(parse_unit("paras").unwrap(), ExpectationUnit::Paragraphs);
        assert_eq!(parse_unit("s").unwrap(), ExpectationUnit::Sentences);
        assert!(parse_unit("bytes").is_err());
    }

    #[test]
    fn test_invalid_amounts() {
        assert!(parse("EXPECT MIN -1 WORDS").is_err());
        assert!(parse("EXPECT MIN 1.5 WORDS").is_err());
        assert!(parse("EXPECT MIN many WORDS").is_err());
        assert!(parse("EXPECT AROUND 5 WORDS").is_err());
    }

    #[test]
    fn test_apply_bounds() {
        let parser = ExpectCommandParser;
        let mut pipeline = PipelineBuilder::new("Test");
        let mut task = TaskBuilder::new("t", "T");

        parser
            .apply_to_task(&parse("EXPECT MIN 1 WORD").unwrap(), &mut task, &mut pipeline)
            .unwrap();
        parser
            .apply_to_task(&parse("EXPECT MAX 10 WORDS").unwrap(), &mut task, &mut pipeline)
            .unwrap();
        assert_eq!(
            task.expectations[&ExpectationUnit::Words],
            ExpectationAmount {
                min: Some(1),
                max: Some(10)
            }
        );

        assert!(parser
            .apply_to_task(&parse("EXPECT MAX 20 WORDS").unwrap(), &mut task, &mut pipeline)
            .is_err());
        assert!(parser
            .apply_to_task(&parse("EXPECT MIN 5 LINES").unwrap(), &mut task, &mut pipeline)
            .is_ok());
        assert!(parser
            .apply_to_task(&parse("EXPECT MAX 2 LINES").unwrap(), &mut task, &mut pipeline)
            .is_err());
    }

    #[test]
    fn test_take_from_task_prefers_exactly() {
        let mut task = TaskJson::new("t", "T", promptbook_core::TaskType::Prompt, "x");
        task.expectations.insert(
            ExpectationUnit::Sentences,
            ExpectationAmount {
                min: Some(3),
                max: Some(3),
            },
        );

        let commands = ExpectCommandParser.take_from_task(&task);
        assert_eq!(
            commands,
            vec![Command::ExpectAmount {
                sign: ExpectSign::Exactly,
                unit: ExpectationUnit::Sentences,
                amount: 3
            }]
        );
    }
}
