//! Built-in sample programs

/// A named sample program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub name: &'static str,
    pub source: &'static str,
}

pub const SAMPLES: &[Sample] = &[
    Sample {
        name: "Array Slicing",
        source: "array arr = {\"A\", \"B\", \"C\", \"D\"};\ncout << arr[1:3];",
    },
    Sample {
        name: "String Slicing",
        source: "string message = \"Hello World\";\ncout << message[0:4];",
    },
    Sample {
        name: "For Loop",
        source: "array names = {\"Alice\", \"Bob\", \"Charlie\"};\nfor (name in names) {\n    cout << name;\n}",
    },
    Sample {
        name: "Complex Example",
        source: "array fruits = {\"Apple\", \"Banana\", \"Cherry\"};\n\
                 string unused = \"This will be optimized away\";\n\
                 string msg = \"Fruits:\";\n\
                 cout << msg;\n\
                 for (fruit in fruits) {\n    cout << fruit;\n}\n\
                 cout << fruits[0:1];",
    },
    Sample {
        name: "Dead Code Test",
        source: "string a = \"First\";\n\
                 string b = a;\n\
                 string c = b;\n\
                 string unused = \"Dead code\";\n\
                 cout << c;\n\
                 array arr = {\"X\", \"Y\", \"Z\"};\n\
                 cout << arr[0:2];",
    },
    Sample {
        name: "While Loop",
        source: "int count = 3;\n\
                 while (count > 0) {\n    cout << count;\n    count = count - 1;\n}\n\
                 cout << \"Liftoff\";",
    },
    Sample {
        name: "Arithmetic",
        source: "array scores = {90, 75, 60};\n\
                 int total = 0;\n\
                 for (s in scores) {\n    total = total + s;\n}\n\
                 cout << total;\n\
                 cout << total / length(scores);\n\
                 cout << scores[1:2];",
    },
];

/// Look up a sample by name, ignoring case
pub fn find(name: &str) -> Option<&'static Sample> {
    SAMPLES.iter().find(|s| s.name.eq_ignore_ascii_case(name.trim()))
}
