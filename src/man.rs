use clap::ValueEnum;

/// Help topics available through `--man`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Topic {
	/// List the available topics
	Entries,
	Synopsis,
	Description,
	Commandline,
	Outputs,
}

const SYNOPSIS: &str = "\
NAME

    pacsquery

SYNOPSIS

    pacsquery   [--pfdcm <HOST:PORT>]
                [--msg <JSON>]
                [--PatientID <ID>]
                [--PACSservice <NAME>]
                [--summaryKeys <KEY1,KEY2,...>]
                [--summaryFile <FILE>]
                [--resultFile <FILE>]
                [--numberOfHitsFile <FILE>]
                [--verbosity <LEVEL>]
                [--man <TOPIC>]
                [--version]
                <outputdir>
";

const DESCRIPTION: &str = "\
DESCRIPTION

    pacsquery asks a PACS for data of interest. It does not speak DICOM itself:
    the query is sent as JSON to the pfdcm intermediary service, which performs
    the actual query on the PACS and returns the hits as JSON.

    The query is either given in full with --msg, or built from --PatientID and
    --PACSservice. The response can be written to <outputdir> as a full JSON
    dump, a summary table and a hit count.

    If no usable query can be built, or no pfdcm service is known, nothing is
    sent and the run reports `status: false`.
";

const COMMANDLINE: &str = "\
ARGS

    --pfdcm <HOST:PORT>
    The pfdcm PACS Q/R intermediary service. Defaults to `service.address`
    in the configuration (PACSQUERY_SERVICE_ADDRESS).

    --msg <JSON>
    The complete message to send to pfdcm, for example

        {\"action\": \"PACSinteract\",
         \"meta\": {\"do\": \"query\", \"on\": {\"PatientID\": \"4780041\"}, \"PACS\": \"orthanc\"}}

    Takes precedence over --PatientID and --PACSservice.

    --PatientID <ID>
    The PatientID to query for.

    --PACSservice <NAME>
    The PACS configuration known to pfdcm. Defaults to `pacs.service` in the
    configuration (PACSQUERY_PACS_SERVICE).

    --summaryKeys <KEY1,KEY2,...>
    The DICOM attributes to show in the summary table.

    --summaryFile <FILE>
    Write the summary table to <outputdir>/<FILE>.

    --resultFile <FILE>
    Write the full JSON response to <outputdir>/<FILE>.

    --numberOfHitsFile <FILE>
    Write the number of hits to <outputdir>/<FILE>.

    --verbosity <LEVEL>
    Log verbosity from 0 (warnings only) to 3 (everything).

    --man <TOPIC>
    Print a help topic and exit. `--man entries` lists the topics.

    --version
    Print the version and exit.
";

const OUTPUTS: &str = "\
OUTPUTS

    <outputdir>/<resultFile>
    The response from pfdcm as JSON, keys sorted, indented by four spaces.

    <outputdir>/<numberOfHitsFile>
    The number of records in `query.data` of the response.

    <outputdir>/<summaryFile>
    A table with one 60 character wide column per summary key. The first row
    holds the key names, every following row one hit.

    The run result is printed to stdout as JSON:

        {\"status\": true, \"response\": {...}, \"outputs\": [...]}
";

/// Renders the page for `topic`.
pub fn page(topic: Topic) -> String {
	match topic {
		Topic::Entries => entries(),
		Topic::Synopsis => String::from(SYNOPSIS),
		Topic::Description => String::from(DESCRIPTION),
		Topic::Commandline => String::from(COMMANDLINE),
		Topic::Outputs => String::from(OUTPUTS),
	}
}

fn entries() -> String {
	let mut page = String::from("TOPICS\n\n");
	for topic in Topic::value_variants() {
		if let Some(value) = topic.to_possible_value() {
			page.push_str(&format!("    {}\n", value.get_name()));
		}
	}
	page
}
