use std::io::{BufRead, Write};

use crate::error::Error;
use crate::form::{FieldKind, FormField};
use crate::submission::{Answer, AnswerSelection};

/// Ask for an answer to every field, one question at a time.
///
/// Invalid input is re-prompted. An empty line skips an optional field.
pub fn prompt_answers<R, W>(
    fields: &[FormField],
    input: &mut R,
    output: &mut W,
) -> Result<AnswerSelection, Error>
where
    R: BufRead,
    W: Write,
{
    let mut answers = AnswerSelection::new();

    for (i, field) in fields.iter().enumerate() {
        let marker = if field.required { " *" } else { "" };
        writeln!(output, "\nQuestion {}: {}{marker}", i + 1, field.label).map_err(io_err)?;
        for (j, option) in field.options.iter().enumerate() {
            writeln!(output, "  {}. {option}", j + 1).map_err(io_err)?;
        }

        let prompt = match field.kind {
            FieldKind::SingleChoice => format!("Select option (1-{}): ", field.options.len()),
            FieldKind::MultiChoice => format!(
                "Select options, comma-separated (1-{}): ",
                field.options.len()
            ),
            FieldKind::Text => "Enter your answer: ".to_string(),
        };

        loop {
            write!(output, "{prompt}").map_err(io_err)?;
            output.flush().map_err(io_err)?;

            let line = read_line(input)?.ok_or_else(|| {
                Error::Validation(format!(
                    "Input closed before answering question {}",
                    i + 1
                ))
            })?;

            if line.is_empty() {
                if field.required {
                    writeln!(output, "This question is required.").map_err(io_err)?;
                    continue;
                }
                break;
            }

            let answer = match field.kind {
                FieldKind::Text => Some(Answer::One(line)),
                FieldKind::SingleChoice => pick(&field.options, &line).map(Answer::One),
                FieldKind::MultiChoice => pick_many(&field.options, &line).map(Answer::Many),
            };

            match answer {
                Some(answer) => {
                    answers.insert(field.id.clone(), answer);
                    break;
                }
                None => writeln!(output, "Invalid choice, try again.").map_err(io_err)?,
            }
        }
    }

    Ok(answers)
}

fn pick(options: &[String], choice: &str) -> Option<String> {
    let n: usize = choice.trim().parse().ok()?;
    options.get(n.checked_sub(1)?).cloned()
}

fn pick_many(options: &[String], choices: &str) -> Option<Vec<String>> {
    let mut picked = Vec::new();
    for choice in choices.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let option = pick(options, choice)?;
        if !picked.contains(&option) {
            picked.push(option);
        }
    }
    (!picked.is_empty()).then_some(picked)
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>, Error> {
    let mut buf = String::new();
    let n = input.read_line(&mut buf).map_err(io_err)?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(buf.trim().to_string()))
}

fn io_err(e: std::io::Error) -> Error {
    Error::Validation(format!("Failed to read answers: {e}"))
}

/// Turn repeated `ID=VALUE` flags into a selection. A repeated ID collects
/// every value, for multi-choice fields.
pub fn parse_answer_flags(flags: &[String]) -> Result<AnswerSelection, Error> {
    let mut answers = AnswerSelection::new();

    for flag in flags {
        let (id, value) = flag
            .split_once('=')
            .map(|(id, value)| (id.trim(), value))
            .filter(|(id, _)| !id.is_empty())
            .ok_or_else(|| {
                Error::Validation(format!("Invalid --answer '{flag}', expected ID=VALUE"))
            })?;

        let next = match answers.remove(id) {
            None => Answer::One(value.to_string()),
            Some(Answer::One(first)) => Answer::Many(vec![first, value.to_string()]),
            Some(Answer::Many(mut values)) => {
                values.push(value.to_string());
                Answer::Many(values)
            }
        };
        answers.insert(id.to_string(), next);
    }

    Ok(answers)
}
