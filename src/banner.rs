pub fn print() {
    println!(
        r#"
   ____ _                                          _ _ _
  / ___| |__  _ __ ___  _ __ ___   ___  __ _ _   _(_) (_) |_
 | |   | '_ \| '__/ _ \| '_ ` _ \ / _ \/ _` | | | | | | | __|
 | |___| | | | | | (_) | | | | | |  __/ (_| | |_| | | | | |_
  \____|_| |_|_|  \___/|_| |_| |_|\___|\__,_|\__,_|_|_|_|\__|

  browser auditing collector
"#
    );
}
