use std::io::{self, Write};

use crate::models::Prediction;

const HEADER: &str = "class_name | class_description | score";
const RULE: &str = "-----------+-------------------+------";

/// The argmax line followed by a one-row `class_name | class_description | score` table.
pub fn render(prediction: &Prediction) -> String {
    format!(
        "argmax={}\n{HEADER}\n{RULE}\n{:>10} | {:>17} | {:0.3}\n",
        prediction.index, prediction.class_name, prediction.description, prediction.score
    )
}

pub fn print(prediction: &Prediction) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(render(prediction).as_bytes())?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_table() {
        let prediction = Prediction {
            index: 373,
            class_name: "n02487347".to_string(),
            description: "macaque".to_string(),
            score: 0.81234,
        };
        assert_eq!(
            render(&prediction),
            "argmax=373\n\
             class_name | class_description | score\n\
             -----------+-------------------+------\n \
             n02487347 |           macaque | 0.812\n"
        );
    }

    #[test]
    fn long_descriptions_are_not_truncated() {
        let prediction = Prediction {
            index: 0,
            class_name: "n01440764".to_string(),
            description: "a rather long class description".to_string(),
            score: 1.0,
        };
        let rendered = render(&prediction);
        assert!(rendered.ends_with(" n01440764 | a rather long class description | 1.000\n"));
    }
}
