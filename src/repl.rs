//! 命令行交互循环
//!
//! 逐行读取用户输入，交给 [`ConversationSession`]，打印回复。
//! 输入 `exit` / `quit` / `bye`（不区分大小写）或 Ctrl-D / Ctrl-C 结束。

use crate::error::{ChatError, Result};
use crate::session::ConversationSession;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::error;

const EXIT_COMMANDS: [&str; 3] = ["exit", "quit", "bye"];

pub fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    EXIT_COMMANDS
        .iter()
        .any(|cmd| line.eq_ignore_ascii_case(cmd))
}

pub async fn run(session: &mut ConversationSession) -> Result<()> {
    let mut editor =
        DefaultEditor::new().map_err(|e| ChatError::Other(format!("readline init failed: {}", e)))?;

    println!("Chat with the agent (type 'exit', 'quit', or 'bye' to end)");
    println!("{}", "-".repeat(60));

    loop {
        // 一轮结束前不接受下一条输入
        let line = match editor.readline("You: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(ChatError::Other(format!("Error reading input: {}", e))),
        };

        if is_exit_command(&line) {
            break;
        }
        let utterance = line.trim();
        if utterance.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(utterance);

        match session.send(utterance).await {
            Ok(reply) => println!("Agent: {}", reply),
            Err(e) => {
                error!(error = %e, "Turn failed");
                eprintln!("Error: {}", e);
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}
