use owo_colors::OwoColorize;

pub fn provide_error_suggestions(err_msg: &str) {
    // Name resolution
    if err_msg.contains("Undeclared identifier") {
        eprintln!(
            "{}",
            "Help: Every variable must be declared in a 'var' section before use.".yellow()
        );
        eprintln!("    {}", "Example: var count : integer;".bright_black());
    }
    else if err_msg.contains("Undeclared procedure or function") {
        eprintln!(
            "{}",
            "Help: Check the spelling, and declare the routine before calling it.".yellow()
        );
        eprintln!("    {}", "Built-in procedures: write, writeln, read".bright_black());
    }
    else if err_msg.contains("Duplicate identifier") {
        eprintln!("{}", "Help: A name can be declared only once per scope.".yellow());
        eprintln!("    {}", "Built-in names such as writeln are reserved as well".bright_black());
    }
    else if err_msg.contains("outside its own body") {
        eprintln!("{}", "Help: A function's result can only be set inside that function.".yellow());
    }

    // Types
    else if err_msg.contains("'div' requires integer operands") {
        eprintln!("{}", "Help: 'div' is integer division; use '/' for real division.".yellow());
        eprintln!("    {}", "Example: 7 div 2 = 3, 7 / 2 = 3.5".bright_black());
    }
    else if err_msg.contains("cannot assign real value")
        || err_msg.contains("Cannot pass real value")
    {
        eprintln!("{}", "Help: Reals never narrow to integer implicitly.".yellow());
        eprintln!("    {}", "Declare the target as real, or compute with 'div'".bright_black());
    }
    else if err_msg.contains("Type mismatch") || err_msg.contains("cannot assign") {
        eprintln!("{}", "Help: Make sure the value matches the declared type.".yellow());
        eprintln!("    {}", "minipas has types: integer, real, boolean, string".bright_black());
    }
    else if err_msg.contains("must be indexed") {
        eprintln!("{}", "Help: Arrays are read and written one element at a time.".yellow());
        eprintln!("    {}", "Example: data[i] := 0".bright_black());
    }

    // Calls
    else if err_msg.contains("argument(s), got") {
        eprintln!("{}", "Help: Routine called with the wrong number of arguments.".yellow());
        eprintln!("    {}", "Check the parameter list in its declaration".bright_black());
    }
    else if err_msg.contains("did not assign a result") {
        eprintln!(
            "{}",
            "Help: Assign to the function's name on every path through its body.".yellow()
        );
        eprintln!("    {}", "Example: Square := n * n".bright_black());
    }
    else if err_msg.contains("Call stack overflow") {
        eprintln!(
            "{}",
            "Help: Recursion too deep; check that recursive calls reach a base case.".yellow()
        );
    }

    // Runtime
    else if err_msg.contains("Division by zero") {
        eprintln!("{}", "Help: You cannot divide by zero.".yellow());
        eprintln!("    {}", "Check if the divisor is zero before the operation.".bright_black());
    }
    else if err_msg.contains("out of bounds") {
        eprintln!("{}", "Help: Index is outside the declared range of the array.".yellow());
    }
    else if err_msg.starts_with("READ") {
        eprintln!(
            "{}",
            "Help: READ takes one line of whitespace-separated values, one per variable.".yellow()
        );
        eprintln!("    {}", "Example input for read(n, x): 3 2.5".bright_black());
    }

    // Lexing and parsing
    else if err_msg.contains("Unterminated string") {
        eprintln!("{}", "Help: String is missing its closing quote.".yellow());
        eprintln!("    {}", "Strings are written with single quotes: 'hello'".bright_black());
    }
    else if err_msg.contains("Unterminated comment") {
        eprintln!("{}", "Help: Comments start with '{' and must end with '}'.".yellow());
    }
    else if err_msg.contains("Expected") {
        eprintln!("{}", "Help: Missing required syntax element.".yellow());
        if err_msg.contains("';'") {
            eprintln!("    {}", "Statements and declarations are separated by ';'".bright_black());
        } else if err_msg.contains("'.'") {
            eprintln!("    {}", "A program ends with 'end.'".bright_black());
        } else if err_msg.contains("identifier") {
            eprintln!("    {}", "Expected a variable, procedure or function name".bright_black());
        }
    }
}
